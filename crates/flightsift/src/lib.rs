pub mod airports;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fingerprint;
pub mod grouping;
pub mod history;
pub mod logging;
pub mod message;
pub mod pipeline;
pub mod providers;
pub mod sanitize;
pub mod selector;

pub use airports::{AirportInfo, AirportReference};
pub use classifier::{ClassificationResult, Classifier, FlightScore, MessageKind};
pub use config::{load_config, load_config_from_str, Config};
pub use error::{ConfigError, FlightsiftError, ForwardError, HistoryError, Result, TransportError};
pub use extractor::{CodeSource, FieldExtractor, FlightRecord, Route};
pub use fingerprint::Fingerprint;
pub use grouping::{group, BookingGroup, GroupKey};
pub use history::{Decision, HistoryStore, ProcessedFlightEntry};
pub use logging::init_logging;
pub use message::{parse_rfc822, RawMessage};
pub use pipeline::{
    forward_all, Forwarder, ForwardRequest, MessageSource, ProgressReporter, ScanPipeline,
    ScanReport,
};
pub use providers::{Provider, ProviderDescriptor, ProviderKind, ProviderTable};
pub use selector::{select, CanonicalBooking};
