pub mod validacao;
pub mod auth;
pub mod filial;
pub mod aluno;
pub mod professor;
pub mod turma;
pub mod matricula;
pub mod presenca;
pub mod pagamento;
pub mod documento;
pub mod combo;
pub mod configuracoes;
pub mod gestor;
pub mod dashboard;
pub mod relatorio;
