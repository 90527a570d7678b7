pub mod aggregate;
pub mod analyze;
pub mod factcheck;
pub mod images;
pub mod scrape;
pub mod urls;

pub use analyze::{PostAnalyzer, LOCAL_IMAGES_KEY};
pub use factcheck::{FactCheckClient, FactCheckVerdict};
pub use images::ImageLabel;
pub use scrape::PageContent;
