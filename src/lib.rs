//! # Healthtrack API
//!
//! A REST API built with Rust, Axum, and PostgreSQL for tracking student
//! health records: demographics, allergies, health measurements, medical
//! history, and screening results, consumed by admins, teachers, and parents
//! with different visibility rules.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── config/           # Configuration modules (database, CORS, sessions)
//! ├── middleware/       # Session extractor (identity resolution)
//! ├── policy/           # Authorization engine and visibility filters
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Login and logout
//! │   ├── users/       # User accounts (admins, teachers, parents)
//! │   ├── class_groups/# Class groups and teacher assignment
//! │   ├── students/    # Student records
//! │   ├── health_data/ # Height, weight, blood type, allergy links
//! │   ├── medical_history/
//! │   ├── test_results/# Screening results and the test catalog
//! │   └── allergies/   # Allergy catalog
//! └── utils/           # Shared utilities (errors, password hashing)
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `controller.rs`: HTTP handlers (routes)
//! - `service.rs`: Business logic
//! - `model.rs`: Data models, DTOs, database structs
//! - `router.rs`: Axum router configuration
//!
//! ## Access model
//!
//! Every request resolves its session cookie to a `Principal` (id, role,
//! email). All permission decisions are made by `policy::authorize`, a pure
//! function over the principal and the target's owner context; list
//! endpoints return the role-scoped visible subset via `policy::visibility`.
//!
//! | Role | Students | Class groups | Health records |
//! |------|----------|--------------|----------------|
//! | Admin | all | all | all |
//! | Teacher | own class groups | own class groups | read own classes, write own classes |
//! | Parent | own children | none | read own children |
//!
//! ## Security Considerations
//!
//! - Passwords are hashed using bcrypt
//! - Sessions are server-side rows with a two-hour expiry, carried by an
//!   HttpOnly cookie
//! - A denied caller receives the same Forbidden whether or not the target
//!   exists; existence is only revealed after authorization passes
//! - The first admin account is created via CLI, never through the API

pub mod cli;
pub mod config;
pub mod docs;
pub mod middleware;
pub mod modules;
pub mod policy;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;
