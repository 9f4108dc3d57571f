pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod auth;

pub mod host {
    pub mod controller;
    pub mod repository;
    pub mod usecase;

    pub use controller::configure_routes;
    pub use repository::{AlertedHost, HostRepository, NewHost, SqliteHostRepository};
    pub use usecase::{AlertOutcome, HostUseCase};

    #[cfg(test)]
    pub(crate) mod test_support;

    #[cfg(test)]
    mod usecase_tests;

    #[cfg(test)]
    mod controller_tests;
}

pub mod alerts {
    pub mod notifier;
    pub mod scheduler;

    pub use notifier::{AlertEntry, AlertNotifier, AlertReport, AlertTrigger, SmtpNotifier};
    pub use scheduler::{AlertScheduler, SchedulerStatus};
}

pub mod openapi;
