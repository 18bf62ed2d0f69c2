pub mod blank_line;
pub mod block_quote;
pub mod code_fence;
pub mod definition;
pub mod heading;
pub mod html_block;
pub mod indented_code;
pub mod list;
pub mod paragraph;
pub mod setext_heading;
pub mod table;
pub mod thematic_break;

pub use blank_line::BlankLine;
pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceData, FenceKind};
pub use definition::Definition;
pub use heading::Heading;
pub use html_block::HtmlBlock;
pub use indented_code::IndentedCode;
pub use list::List;
pub use paragraph::Paragraph;
pub use setext_heading::SetextHeading;
pub use table::Table;
pub use thematic_break::ThematicBreak;
