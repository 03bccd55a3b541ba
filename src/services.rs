// src/services.rs

pub mod aluno_service;
pub mod auth;
pub mod combo_service;
pub mod dashboard_service;
pub mod documento_service;
pub mod filial_service;
pub mod gestor_service;
pub mod matricula_service;
pub mod pagamento_service;
pub mod presenca_service;
pub mod professor_service;
pub mod relatorio_service;
pub mod turma_service;

#[cfg(test)]
mod fixtures;
