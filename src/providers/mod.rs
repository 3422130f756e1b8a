pub mod advisorkhoj;
pub mod moneycontrol;
pub mod util;

pub use advisorkhoj::AdvisorkhojProvider;
pub use moneycontrol::MoneycontrolProvider;
