pub mod use_board;
pub mod use_college;
pub mod use_note_like;
pub mod use_note_upload;
pub mod use_remote_collection;
