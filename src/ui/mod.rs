pub mod terminal;
pub mod view;

pub use view::ChatView;
