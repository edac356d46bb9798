//! Engine services
//!
//! Each service is a cheap-to-clone handle over the shared store. None of
//! them holds state of its own apart from the conversion audit log and the
//! outbox.

pub mod bulk;
pub mod conversion;
pub mod duplicates;
pub mod export;
pub mod leads;
pub mod mail;
pub mod tags;
pub mod views;

pub use bulk::{BulkOperationProcessor, CancelToken};
pub use conversion::ConversionService;
pub use duplicates::DeduplicationEngine;
pub use export::{LeadExport, EXPORT_COLUMNS};
pub use leads::LeadService;
pub use mail::{InMemoryOutbox, MailOutbox, OutboundEmail};
pub use tags::{CampaignAssociator, CampaignUpdate, TagEdit, TagManager, TagUpdate};
pub use views::ViewFilterEngine;
