//! # Dialogue 模块
//!
//! 对话内容与所有会消费输入的界面组件。
//!
//! - `content`：角色资源的结构与加载期校验
//! - `text`：命令标记替换与折行
//! - [`VoiceDialog`] / [`OptionDialog`] / [`Keyboard`] / [`Prompt`]：对话原语
//! - [`TitleMenu`] / [`Results`] / [`ExitButton`]：标题菜单、结果页、全局退出按钮

pub mod content;
mod exit;
mod keyboard;
mod menu;
mod options;
mod prompt;
mod results;
pub mod text;
mod title;
mod voice;

pub use content::{CharacterScript, ContentLibrary, DialogOption, DialogueNode};
pub use exit::ExitButton;
pub use keyboard::{Key, Keyboard};
pub use menu::ListCursor;
pub use options::OptionDialog;
pub use prompt::Prompt;
pub use results::Results;
pub use text::{Rendered, substitute, wrap};
pub use title::{MENU_PLAY, MENU_QUIT, TitleMenu};
pub use voice::{Speaker, VoiceDialog};
