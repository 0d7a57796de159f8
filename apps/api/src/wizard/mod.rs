//! The five-step wizard: template → current CV → job description → review → result.

pub mod handlers;
pub mod selection;
pub mod service;
pub mod session;

pub use service::WizardService;
pub use session::{WizardError, WizardStep, WizardView};
