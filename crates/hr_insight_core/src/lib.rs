pub mod domain;
pub mod ports;
pub mod session;

pub use domain::{
    AnswerMetadata, ArchivedConversation, ArchivedMessage, DepartmentCount, MemoryStats, Message,
    Performer, QueryAnswer, Role, SearchHit, Session, SystemStatus,
};
pub use ports::{ConversationArchiveService, HrDataService, PortError, PortResult, QueryService};
pub use session::{ConversationSessionManager, SubmitError, SubmitOutcome};
