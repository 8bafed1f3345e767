pub mod provider_errors;
