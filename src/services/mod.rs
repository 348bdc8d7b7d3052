pub mod access;
pub mod auth_service;
pub mod certificate_service;
pub mod directory_service;
pub mod event_service;
pub mod points_service;
pub mod reconcile_service;
pub mod token_service;
pub mod verification_service;
