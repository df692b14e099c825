pub mod domain;
pub mod editor;
pub mod error;
pub mod play;
pub mod ports;
pub mod random;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{Card, CardId, CardState, Deck, DeckId, GameId, GameInvite, GameRecord};
pub use editor::{CardDraft, CardEditor};
pub use error::{EditorError, PlayError, PlayResult};
pub use play::{PlayPorts, PlaySession, Progress, SessionPhase};
pub use ports::{
    CardFields, DeckService, InvitePresenter, NotificationService, PortError, PortResult,
    RecordStore,
};
