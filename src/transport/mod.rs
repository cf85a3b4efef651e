pub mod attachment;
pub mod destination;
pub mod gateway;

pub use attachment::{Attachment, AttachmentKind};
pub use destination::normalize_destination;
pub use gateway::{DeliveryReceipt, HttpGateway, MessageGateway, OutboundMessage};
