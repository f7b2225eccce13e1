mod int_or_template;
pub mod networking;

pub use int_or_template::IntOrTemplate;
