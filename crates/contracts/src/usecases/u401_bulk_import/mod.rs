pub mod request;
pub mod response;

pub use request::BulkCreateRequest;
pub use response::{
    BulkCreateResult, CreatedProductSummary, CreationError, CsvParseResult, ImageIngestResult,
    MatchedBy, ParsedProductRow, RowError, UploadFailure, UploadedImage,
};
