// src/services/aluno_service.rs

use chrono::Local;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AlunoRepository, ConfiguracoesRepository},
    middleware::filial::FilialScope,
    models::aluno::{Aluno, AlunoFiltro, CreateAlunoPayload, StatusPagamento, UpdateAlunoPayload},
};

#[derive(Clone)]
pub struct AlunoService {
    aluno_repo: AlunoRepository,
    configuracoes_repo: ConfiguracoesRepository,
    pool: PgPool,
}

impl AlunoService {
    pub fn new(aluno_repo: AlunoRepository, configuracoes_repo: ConfiguracoesRepository, pool: PgPool) -> Self {
        Self { aluno_repo, configuracoes_repo, pool }
    }

    pub async fn list_alunos(&self, scope: &FilialScope, filtro: &AlunoFiltro) -> Result<Vec<Aluno>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.aluno_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_aluno(&self, scope: &FilialScope, id: i32) -> Result<Aluno, AppError> {
        self.aluno_repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|a| scope.pode_ler(a.filial_id))
            .ok_or(AppError::NotFound("aluno"))
    }

    pub async fn create_aluno(&self, scope: &FilialScope, payload: &CreateAlunoPayload) -> Result<Aluno, AppError> {
        let filial_id = scope.filial_para_cadastro(payload.filial_id)?;

        let mut tx = self.pool.begin().await?;

        let mut aluno = self.aluno_repo.create(&mut *tx, payload, filial_id).await?;

        // Aluno novo ainda não pagou nada: pendente ou atrasado conforme o dia
        let configuracoes = self.configuracoes_repo.get(&mut *tx).await?;
        let hoje = Local::now().date_naive();
        let status = StatusPagamento::calcular(false, hoje, configuracoes.dia_vencimento as u32);
        if status != aluno.status_pagamento {
            self.aluno_repo.set_status_pagamento(&mut *tx, aluno.id, status).await?;
            aluno.status_pagamento = status;
        }

        tx.commit().await?;

        tracing::info!("✅ Aluno {} cadastrado na filial {}", aluno.id, filial_id);
        Ok(aluno)
    }

    pub async fn update_aluno(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdateAlunoPayload,
    ) -> Result<Aluno, AppError> {
        let mut tx = self.pool.begin().await?;

        let atual = self
            .aluno_repo
            .lock_by_id(&mut *tx, id)
            .await?
            .filter(|a| scope.pode_ler(a.filial_id))
            .ok_or(AppError::NotFound("aluno"))?;
        scope.garantir_escrita(atual.filial_id)?;

        let nova_filial = payload.filial_id.filter(|f| *f != atual.filial_id);
        if let Some(nova_filial) = nova_filial {
            scope.garantir_escrita(nova_filial)?;
            // Matrícula ativa prende o aluno às turmas da filial atual
            if self.aluno_repo.contar_matriculas_ativas(&mut *tx, id).await? > 0 {
                return Err(AppError::FilialMismatch);
            }
        }

        let aluno = self.aluno_repo.update(&mut *tx, id, payload).await?;

        if let Some(nova_filial) = nova_filial {
            self.aluno_repo.mover_lancamentos(&mut *tx, id, nova_filial).await?;
            tracing::info!("✅ Aluno {} transferido da filial {} para a {}", id, atual.filial_id, nova_filial);
        }

        tx.commit().await?;
        Ok(aluno)
    }

    pub async fn delete_aluno(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        self.get_aluno(scope, id).await?;
        self.aluno_repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::fixtures;

    fn service(pool: PgPool) -> AlunoService {
        AlunoService::new(AlunoRepository::new(), ConfiguracoesRepository::new(), pool)
    }

    async fn filial_dos_pagamentos(pool: &PgPool, aluno_id: i32) -> Vec<i32> {
        sqlx::query_scalar("SELECT filial_id FROM pagamentos WHERE aluno_id = $1")
            .bind(aluno_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn aluno_matriculado_nao_troca_de_filial(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let aluno = fixtures::aluno(&pool, centro, "Gabi").await;
        let turma = fixtures::turma(&pool, centro, 10, None).await;
        fixtures::matricula(&pool, aluno, turma).await;
        fixtures::pagamento(&pool, aluno, centro, "2025-03").await;
        let service = service(pool.clone());

        let mudar = UpdateAlunoPayload { filial_id: Some(norte), ..Default::default() };
        let err = service.update_aluno(&fixtures::MATRIZ, aluno, &mudar).await.unwrap_err();
        assert!(matches!(err, AppError::FilialMismatch));

        assert_eq!(service.get_aluno(&fixtures::MATRIZ, aluno).await.unwrap().filial_id, centro);
        assert_eq!(filial_dos_pagamentos(&pool, aluno).await, vec![centro]);
    }

    #[sqlx::test]
    async fn transferencia_leva_pagamentos_junto(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let aluno = fixtures::aluno(&pool, centro, "Gabi").await;
        fixtures::pagamento(&pool, aluno, centro, "2025-02").await;
        fixtures::pagamento(&pool, aluno, centro, "2025-03").await;
        let service = service(pool.clone());

        let mudar = UpdateAlunoPayload { filial_id: Some(norte), ..Default::default() };
        let movido = service.update_aluno(&fixtures::MATRIZ, aluno, &mudar).await.unwrap();

        assert_eq!(movido.filial_id, norte);
        assert_eq!(filial_dos_pagamentos(&pool, aluno).await, vec![norte, norte]);
    }

    #[sqlx::test]
    async fn unidade_nao_ve_nem_altera_aluno_de_outra_filial(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let aluno_norte = fixtures::aluno(&pool, norte, "Rafa").await;
        let aluno_centro = fixtures::aluno(&pool, centro, "Gabi").await;
        let service = service(pool);
        let gestor_centro = fixtures::unidade(centro);

        assert!(matches!(
            service.get_aluno(&gestor_centro, aluno_norte).await,
            Err(AppError::NotFound("aluno"))
        ));
        assert!(matches!(
            service.delete_aluno(&gestor_centro, aluno_norte).await,
            Err(AppError::NotFound("aluno"))
        ));

        let mudar = UpdateAlunoPayload { filial_id: Some(norte), ..Default::default() };
        assert!(matches!(
            service.update_aluno(&gestor_centro, aluno_centro, &mudar).await,
            Err(AppError::FilialForbidden)
        ));

        let filtro = AlunoFiltro { filial_id: Some(norte), ..Default::default() };
        assert!(matches!(
            service.list_alunos(&gestor_centro, &filtro).await,
            Err(AppError::FilialForbidden)
        ));
        let proprios = service.list_alunos(&gestor_centro, &AlunoFiltro::default()).await.unwrap();
        assert_eq!(proprios.iter().map(|a| a.id).collect::<Vec<_>>(), vec![aluno_centro]);
    }

    #[sqlx::test]
    async fn filtros_estreitam_a_listagem(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, centro, 10, None).await;
        let gabi = fixtures::aluno(&pool, centro, "Gabriela Lima").await;
        fixtures::aluno(&pool, centro, "Rafael Costa").await;
        fixtures::matricula(&pool, gabi, turma).await;
        let service = service(pool);
        let scope = fixtures::unidade(centro);

        let por_nome = AlunoFiltro { busca: Some("gabri".into()), ..Default::default() };
        let achados = service.list_alunos(&scope, &por_nome).await.unwrap();
        assert_eq!(achados.len(), 1);
        assert_eq!(achados[0].id, gabi);

        let por_turma = AlunoFiltro { turma_id: Some(turma), ..Default::default() };
        assert_eq!(service.list_alunos(&scope, &por_turma).await.unwrap().len(), 1);

        let inativar = UpdateAlunoPayload { ativo: Some(false), ..Default::default() };
        service.update_aluno(&scope, gabi, &inativar).await.unwrap();
        let ativos = AlunoFiltro { ativo: Some(true), ..Default::default() };
        let restantes = service.list_alunos(&scope, &ativos).await.unwrap();
        assert_eq!(restantes.len(), 1);
        assert_ne!(restantes[0].id, gabi);
    }
}
