// src/handlers.rs

pub mod alunos;
pub mod auth;
pub mod combos;
pub mod configuracoes;
pub mod dashboard;
pub mod documentos;
pub mod filiais;
pub mod gestores;
pub mod matriculas;
pub mod pagamentos;
pub mod presencas;
pub mod professores;
pub mod relatorios;
pub mod turmas;
