pub mod user_repo;
pub use user_repo::UserRepository;
pub mod filial_repo;
pub use filial_repo::FilialRepository;
pub mod aluno_repo;
pub use aluno_repo::AlunoRepository;
pub mod professor_repo;
pub use professor_repo::ProfessorRepository;
pub mod turma_repo;
pub use turma_repo::TurmaRepository;
pub mod matricula_repo;
pub use matricula_repo::MatriculaRepository;
pub mod presenca_repo;
pub use presenca_repo::PresencaRepository;
pub mod pagamento_repo;
pub use pagamento_repo::PagamentoRepository;
pub mod documento_repo;
pub use documento_repo::DocumentoRepository;
pub mod combo_repo;
pub use combo_repo::ComboRepository;
pub mod configuracoes_repo;
pub use configuracoes_repo::ConfiguracoesRepository;
pub mod gestor_repo;
pub use gestor_repo::GestorRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
