pub mod parser;
pub mod session;

pub use parser::{match_list_type, parse_create_list, CreateListIntent};
pub use session::{
    VoiceAction, VoiceConfig, VoiceSession, VoiceState, LIST_TYPE_PROMPT, LIST_TYPE_REPROMPT,
};
