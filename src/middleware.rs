pub mod auth;
pub mod filial;
pub mod i18n;
pub mod rbac;
