pub mod feed;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the main handlers to make them easily accessible
// to the binary that builds the web server router.
pub use feed::feed_handler;
pub use middleware::require_identity;
pub use rest::{
    add_comment_handler, delete_comment_handler, delete_pin_handler, get_pin_handler,
    list_pins_handler, publish_pin_handler, recent_logs_handler, toggle_like_handler,
    toggle_save_handler, update_avatar_handler, user_profile_handler, user_stats_handler,
};
