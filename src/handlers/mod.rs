pub mod search_handlers;
