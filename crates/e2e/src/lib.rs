//! Formpilot E2E
//!
//! Drives a web application's sign-up form through a real browser:
//! navigate to the form, fill every field, submit, assert where the browser
//! landed, then delete the account the run created.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TestRunner                                                 │
//! │    ├── probe()                -> app answers at base_url    │
//! │    ├── launcher.launch()      -> Box<dyn BrowserDriver>     │
//! │    └── FormFlow::run(scenario)-> ScenarioReport             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FormFlow                                                   │
//! │    ├── Navigator      page name -> URL -> loaded document   │
//! │    ├── FormFieldSpec  type | select | check                 │
//! │    ├── Expectation    reaches | not_reaches                 │
//! │    └── TeardownRoutine                                      │
//! │          └── SessionHelper (login when needed)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver (trait)   ChromiumDriver over chromiumoxide  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod chromium;
pub mod driver;
pub mod error;
pub mod flow;
pub mod form;
pub mod navigation;
pub mod probe;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod teardown;
pub mod wait;

pub use chromium::{ChromiumConfig, ChromiumDriver, ChromiumLauncher};
pub use driver::{BrowserDriver, DriverError, DriverLauncher, DriverResult};
pub use error::{E2eError, E2eResult};
pub use flow::{FormFlow, ScenarioReport, ScenarioState, StepResult};
pub use form::FormFieldSpec;
pub use navigation::{NavigationOutcome, Navigator, PageTarget};
pub use runner::{RunnerConfig, TestRunner, TestSuiteResult};
pub use scenario::{Expectation, Scenario, TeardownPolicy};
pub use session::SessionHelper;
pub use teardown::TeardownRoutine;
