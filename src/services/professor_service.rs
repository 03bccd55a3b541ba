// src/services/professor_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ProfessorRepository,
    middleware::filial::FilialScope,
    models::professor::{CreateProfessorPayload, Professor, ProfessorFiltro, UpdateProfessorPayload},
};

#[derive(Clone)]
pub struct ProfessorService {
    repo: ProfessorRepository,
    pool: PgPool,
}

impl ProfessorService {
    pub fn new(repo: ProfessorRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_professores(
        &self,
        scope: &FilialScope,
        filtro: &ProfessorFiltro,
    ) -> Result<Vec<Professor>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_professor(&self, scope: &FilialScope, id: i32) -> Result<Professor, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|p| scope.pode_ler(p.filial_id))
            .ok_or(AppError::NotFound("professor"))
    }

    pub async fn create_professor(
        &self,
        scope: &FilialScope,
        payload: &CreateProfessorPayload,
    ) -> Result<Professor, AppError> {
        let filial_id = scope.filial_para_cadastro(payload.filial_id)?;
        let professor = self.repo.create(&self.pool, payload, filial_id).await?;
        tracing::info!("✅ Professor {} cadastrado na filial {}", professor.id, filial_id);
        Ok(professor)
    }

    pub async fn update_professor(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdateProfessorPayload,
    ) -> Result<Professor, AppError> {
        let mut tx = self.pool.begin().await?;

        let atual = self
            .repo
            .lock_by_id(&mut *tx, id)
            .await?
            .filter(|p| scope.pode_ler(p.filial_id))
            .ok_or(AppError::NotFound("professor"))?;
        scope.garantir_escrita(atual.filial_id)?;

        if let Some(nova_filial) = payload.filial_id.filter(|f| *f != atual.filial_id) {
            scope.garantir_escrita(nova_filial)?;
            // As turmas dele continuam na filial atual
            if self.repo.contar_turmas(&mut *tx, id).await? > 0 {
                return Err(AppError::FilialMismatch);
            }
        }

        let professor = self.repo.update(&mut *tx, id, payload).await?;

        tx.commit().await?;
        Ok(professor)
    }

    pub async fn delete_professor(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        self.get_professor(scope, id).await?;
        self.repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::fixtures;

    #[sqlx::test]
    async fn professor_com_turma_nao_troca_de_filial(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let professor = fixtures::professor(&pool, centro, "Carlos").await;
        let turma = fixtures::turma(&pool, centro, 10, Some(professor)).await;
        let service = ProfessorService::new(ProfessorRepository::new(), pool.clone());

        let mudar = UpdateProfessorPayload { filial_id: Some(norte), ..Default::default() };
        let err = service.update_professor(&fixtures::MATRIZ, professor, &mudar).await.unwrap_err();
        assert!(matches!(err, AppError::FilialMismatch));

        // Sem turma, a troca passa
        sqlx::query("DELETE FROM turmas WHERE id = $1").bind(turma).execute(&pool).await.unwrap();
        let movido = service.update_professor(&fixtures::MATRIZ, professor, &mudar).await.unwrap();
        assert_eq!(movido.filial_id, norte);
    }

    #[sqlx::test]
    async fn unidade_so_enxerga_os_proprios_professores(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let do_centro = fixtures::professor(&pool, centro, "Carlos").await;
        let do_norte = fixtures::professor(&pool, norte, "Nina").await;
        let service = ProfessorService::new(ProfessorRepository::new(), pool);
        let gestor_centro = fixtures::unidade(centro);

        assert!(matches!(
            service.get_professor(&gestor_centro, do_norte).await,
            Err(AppError::NotFound("professor"))
        ));
        let renomear = UpdateProfessorPayload { nome: Some("Nina Alves".into()), ..Default::default() };
        assert!(matches!(
            service.update_professor(&gestor_centro, do_norte, &renomear).await,
            Err(AppError::NotFound("professor"))
        ));

        let lista = service.list_professores(&gestor_centro, &ProfessorFiltro::default()).await.unwrap();
        assert_eq!(lista.iter().map(|p| p.id).collect::<Vec<_>>(), vec![do_centro]);
    }
}
