pub mod join;
pub mod presenter;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers so the binary can build the router from one place.
pub use join::join_ws_handler;
pub use rest::{
    add_card_handler, create_deck_handler, edit_card_handler, get_game_handler,
    list_cards_handler,
};
pub use ws_handler::ws_handler;
