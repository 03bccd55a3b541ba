// src/services/combo_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ComboRepository,
    middleware::filial::FilialScope,
    models::combo::{ComboAulas, ComboFiltro, CreateComboPayload, UpdateComboPayload},
};

#[derive(Clone)]
pub struct ComboService {
    repo: ComboRepository,
    pool: PgPool,
}

impl ComboService {
    pub fn new(repo: ComboRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_combos(&self, scope: &FilialScope, filtro: &ComboFiltro) -> Result<Vec<ComboAulas>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_combo(&self, scope: &FilialScope, id: i32) -> Result<ComboAulas, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|c| c.filial_id.is_none_or(|f| scope.pode_ler(f)))
            .ok_or(AppError::NotFound("combo"))
    }

    /// Combo sem filial vale para a rede toda, e só a matriz cria esse tipo.
    pub async fn create_combo(&self, scope: &FilialScope, payload: &CreateComboPayload) -> Result<ComboAulas, AppError> {
        let filial_id = if scope.fixa {
            Some(scope.filial_para_cadastro(payload.filial_id)?)
        } else {
            payload.filial_id
        };
        self.repo.create(&self.pool, payload, filial_id).await
    }

    pub async fn update_combo(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdateComboPayload,
    ) -> Result<ComboAulas, AppError> {
        let combo = self.get_combo(scope, id).await?;
        self.check_escrita(scope, &combo)?;
        self.repo.update(&self.pool, id, payload).await
    }

    pub async fn delete_combo(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        let combo = self.get_combo(scope, id).await?;
        self.check_escrita(scope, &combo)?;
        self.repo.delete(&self.pool, id).await
    }

    fn check_escrita(&self, scope: &FilialScope, combo: &ComboAulas) -> Result<(), AppError> {
        match combo.filial_id {
            Some(filial_id) => scope.garantir_escrita(filial_id),
            None if scope.fixa => Err(AppError::FilialForbidden),
            None => Ok(()),
        }
    }
}
