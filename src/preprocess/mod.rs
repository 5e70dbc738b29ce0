// Text preprocessing: normalizer, stopword filter and lemmatizer, composed
// into the pipeline that feeds the sentiment classifier.

pub mod lemmatizer;
pub mod normalizer;
pub mod pipeline;
pub mod stopwords;

pub use lemmatizer::Lemmatizer;
pub use normalizer::{normalize, CleaningConfig};
pub use pipeline::{PreprocessTrace, Preprocessor};
pub use stopwords::{remove_stopwords, Language, StopwordFilter};
