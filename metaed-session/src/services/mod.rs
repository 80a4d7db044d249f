//! Session services: codec, engine transport, downloads and the controller

pub mod codec;
pub mod controller;
pub mod download;
pub mod engine_client;

pub use codec::{ApplyStatus, ExtractedMetadata, ModifyOutcome, PartialApplyWarning, RoundTripCodec};
pub use controller::SessionController;
pub use download::DownloadArtifact;
pub use engine_client::{
    ExtractRequest, HttpMetadataEngine, MetadataEngine, ModifyRequest, RawResponse,
};
