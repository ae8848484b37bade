mod audit;
mod content;
mod ids;
mod position;
mod preferences;
mod timestamp;
mod tour;
mod user;

pub use audit::{AUDIT_PAGE_SIZE, AuditLog, AuditLogPage, AuditQuery, AuditStats};
pub use content::{
    AppliedChange, ContentAction, ContentChange, ContentCounts, ContentError, ContentFilter,
    ContentItem, ContentKind, ContentRequest, entries, flatten,
};
pub use ids::{AuditLogId, ParseIdError, TourPosition, UserId};
pub use position::{PositionDetail, PositionInfo, TourSummary};
pub use preferences::{Preferences, StoredSession};
pub use tour::{Proverb, Sentence, Tour, TourError, TourList, parse_letter};
pub use user::{Role, RoleFilter, RoleFlag, RoleUpdate, UserFilter, UserRecord, UserSession};
