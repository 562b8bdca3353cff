pub mod input;
pub mod read;
pub mod site;

pub use input::InputFile;
pub use read::Read;
pub use site::Site;
