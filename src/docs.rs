// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::alterar_senha,

        // --- Filiais ---
        handlers::filiais::list_filiais,
        handlers::filiais::get_filial,
        handlers::filiais::create_filial,
        handlers::filiais::update_filial,
        handlers::filiais::delete_filial,
        handlers::filiais::get_sincronizacao,
        handlers::filiais::sincronizar,

        // --- Cadastros ---
        handlers::alunos::list_alunos,
        handlers::alunos::get_aluno,
        handlers::alunos::create_aluno,
        handlers::alunos::update_aluno,
        handlers::alunos::delete_aluno,
        handlers::professores::list_professores,
        handlers::professores::get_professor,
        handlers::professores::create_professor,
        handlers::professores::update_professor,
        handlers::professores::delete_professor,
        handlers::turmas::list_turmas,
        handlers::turmas::get_turma,
        handlers::turmas::create_turma,
        handlers::turmas::update_turma,
        handlers::turmas::delete_turma,
        handlers::matriculas::list_matriculas,
        handlers::matriculas::get_matricula,
        handlers::matriculas::create_matricula,
        handlers::matriculas::update_matricula,
        handlers::matriculas::delete_matricula,
        handlers::combos::list_combos,
        handlers::combos::get_combo,
        handlers::combos::create_combo,
        handlers::combos::update_combo,
        handlers::combos::delete_combo,

        // --- Presenças ---
        handlers::presencas::list_presencas,
        handlers::presencas::get_presenca,
        handlers::presencas::registrar_chamada,
        handlers::presencas::create_presenca,
        handlers::presencas::update_presenca,
        handlers::presencas::delete_presenca,

        // --- Financeiro ---
        handlers::pagamentos::list_pagamentos,
        handlers::pagamentos::get_pagamento,
        handlers::pagamentos::create_pagamento,
        handlers::pagamentos::update_pagamento,
        handlers::pagamentos::delete_pagamento,
        handlers::pagamentos::recalcular_status,

        // --- Documentos ---
        handlers::documentos::list_documentos,
        handlers::documentos::upload_documento,
        handlers::documentos::download_documento,
        handlers::documentos::delete_documento,

        // --- Rede ---
        handlers::configuracoes::get_configuracoes,
        handlers::configuracoes::update_configuracoes,
        handlers::gestores::list_gestores,
        handlers::gestores::get_gestor,
        handlers::gestores::create_gestor,
        handlers::gestores::update_gestor,
        handlers::gestores::delete_gestor,

        // --- Dashboard e relatórios ---
        handlers::dashboard::get_metrics,
        handlers::relatorios::relatorio_financeiro,
        handlers::relatorios::relatorio_alunos,
        handlers::relatorios::relatorio_presencas,
        handlers::relatorios::exportar_alunos,
        handlers::relatorios::exportar_pagamentos,
        handlers::relatorios::exportar_presencas,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Papel,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AlterarSenhaPayload,
            models::auth::SessionUser,
            models::auth::AuthResponse,

            // --- Filiais ---
            models::filial::Filial,
            models::filial::CreateFilialPayload,
            models::filial::UpdateFilialPayload,
            models::filial::SyncState,
            models::filial::SyncTotais,
            models::filial::SyncStatus,

            // --- Cadastros ---
            models::aluno::StatusPagamento,
            models::aluno::Aluno,
            models::aluno::CreateAlunoPayload,
            models::aluno::UpdateAlunoPayload,
            models::professor::Professor,
            models::professor::CreateProfessorPayload,
            models::professor::UpdateProfessorPayload,
            models::turma::Turma,
            models::turma::TurmaOcupacao,
            models::turma::CreateTurmaPayload,
            models::turma::UpdateTurmaPayload,
            models::matricula::Matricula,
            models::matricula::MatriculaDetalhe,
            models::matricula::CreateMatriculaPayload,
            models::matricula::UpdateMatriculaPayload,
            models::combo::ComboAulas,
            models::combo::CreateComboPayload,
            models::combo::UpdateComboPayload,

            // --- Presenças ---
            models::presenca::Presenca,
            models::presenca::PresencaDetalhe,
            models::presenca::CreatePresencaPayload,
            models::presenca::UpdatePresencaPayload,
            models::presenca::RegistroChamada,
            models::presenca::ChamadaPayload,

            // --- Financeiro ---
            models::pagamento::FormaPagamento,
            models::pagamento::Pagamento,
            models::pagamento::PagamentoDetalhe,
            models::pagamento::CreatePagamentoPayload,
            models::pagamento::UpdatePagamentoPayload,
            handlers::pagamentos::RecalculoResponse,

            // --- Documentos ---
            models::documento::Documento,
            handlers::documentos::DocumentoUpload,

            // --- Rede ---
            models::configuracoes::Configuracoes,
            models::configuracoes::UpdateConfiguracoesRequest,
            models::gestor::GestorUnidade,
            models::gestor::CreateGestorPayload,
            models::gestor::UpdateGestorPayload,

            // --- Dashboard e relatórios ---
            models::dashboard::DashboardMetrics,
            models::relatorio::ReceitaMensal,
            models::relatorio::ReceitaPorForma,
            models::relatorio::RelatorioFinanceiro,
            models::relatorio::FaixaEtaria,
            models::relatorio::AlunosPorFilial,
            models::relatorio::AlunosPorStatus,
            models::relatorio::RelatorioAlunos,
            models::relatorio::PresencaPorTurma,
            models::relatorio::RelatorioPresencas,
        )
    ),
    tags(
        (name = "Auth", description = "Login, sessão e troca de senha"),
        (name = "Filiais", description = "Unidades da rede e sincronização"),
        (name = "Alunos", description = "Cadastro de alunos"),
        (name = "Professores", description = "Cadastro de professores"),
        (name = "Turmas", description = "Turmas, horários e ocupação"),
        (name = "Matrículas", description = "Vínculo aluno-turma"),
        (name = "Combos", description = "Pacotes de aulas"),
        (name = "Presenças", description = "Chamada e frequência"),
        (name = "Pagamentos", description = "Mensalidades e status financeiro"),
        (name = "Documentos", description = "Upload e download de arquivos"),
        (name = "Configurações", description = "Identidade visual e vencimento da rede"),
        (name = "Gestores", description = "Contas dos gestores de unidade"),
        (name = "Dashboard", description = "Indicadores do mês"),
        (name = "Relatórios", description = "Relatórios agregados e exportação CSV")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
