pub mod collaborators;
pub mod config;
pub mod correlation;
pub mod emitter;
pub mod error;
pub mod hash;
pub mod pending;
pub mod resolver;
pub mod state;
pub mod types;
pub mod validator;
pub mod workflow;

pub use collaborators::{
    BeaconTransport, InteractionChannel, InteractionSurface, ProtocolFactory, ProtocolService,
    WalletDirectory,
};
pub use config::EngineConfig;
pub use correlation::{CorrelationId, CorrelationIds};
pub use emitter::{Outbound, ResponseEmitter};
pub use error::{
    ErrorKind, ErrorReport, PendingError, ProtocolError, RequestError, ResolutionError,
    Result as RequestResult, TransportError, ValidationError,
};
pub use pending::{PendingRequest, PendingRequests, ResolvedContext};
pub use resolver::WalletResolver;
pub use state::{Phase, ScopeInput};
pub use types::{
    BeaconRequest, BeaconResponse, Handoff, HandoffKey, InteractionData, InteractionInfo,
    MessageDefinition, MessageKind, PermissionScope, RequestKind, ReviewableTransaction,
    SigningType, WalletRef,
};
pub use workflow::{Collaborators, Interaction, RequestWorkflow, ResponseHandler};
