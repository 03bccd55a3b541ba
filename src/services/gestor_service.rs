// src/services/gestor_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{FilialRepository, GestorRepository, UserRepository},
    middleware::filial::FilialScope,
    models::{
        auth::Papel,
        gestor::{CreateGestorPayload, GestorFiltro, GestorUnidade, UpdateGestorPayload},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct GestorService {
    gestor_repo: GestorRepository,
    user_repo: UserRepository,
    filial_repo: FilialRepository,
    pool: PgPool,
}

impl GestorService {
    pub fn new(
        gestor_repo: GestorRepository,
        user_repo: UserRepository,
        filial_repo: FilialRepository,
        pool: PgPool,
    ) -> Self {
        Self { gestor_repo, user_repo, filial_repo, pool }
    }

    pub async fn list_gestores(&self, scope: &FilialScope, filtro: &GestorFiltro) -> Result<Vec<GestorUnidade>, AppError> {
        let filtro = GestorFiltro {
            busca: filtro.busca.clone(),
            filial_id: scope.filtro(filtro.filial_id)?,
        };
        self.gestor_repo.list(&self.pool, &filtro).await
    }

    pub async fn get_gestor(&self, scope: &FilialScope, id: i32) -> Result<GestorUnidade, AppError> {
        self.gestor_repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|g| scope.pode_ler(g.filial_id))
            .ok_or(AppError::NotFound("gestor"))
    }

    async fn check_filial(&self, filial_id: i32) -> Result<(), AppError> {
        self.filial_repo
            .find_by_id(&self.pool, filial_id)
            .await?
            .ok_or(AppError::InvalidReference)?;
        Ok(())
    }

    /// Cria o gestor e a conta de acesso dele na mesma transação.
    pub async fn create_gestor(&self, payload: &CreateGestorPayload) -> Result<GestorUnidade, AppError> {
        self.check_filial(payload.filial_id).await?;
        let senha_hash = hash_password(&payload.senha).await?;

        let mut tx = self.pool.begin().await?;

        let usuario = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.email,
                &senha_hash,
                payload.nome.trim(),
                Papel::Gestor,
                Some(payload.filial_id),
            )
            .await?;
        let gestor = self.gestor_repo.create(&mut *tx, payload, usuario.id).await?;

        tx.commit().await?;

        tracing::info!("✅ Gestor {} criado para a filial {}", gestor.id, gestor.filial_id);
        Ok(gestor)
    }

    pub async fn update_gestor(&self, id: i32, payload: &UpdateGestorPayload) -> Result<GestorUnidade, AppError> {
        if let Some(filial_id) = payload.filial_id {
            self.check_filial(filial_id).await?;
        }
        let senha_hash = match &payload.senha {
            Some(senha) => Some(hash_password(senha).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let gestor = self.gestor_repo.update(&mut *tx, id, payload).await?;

        // A conta de acesso acompanha o cadastro
        self.user_repo
            .update_user(
                &mut *tx,
                gestor.usuario_id,
                payload.email.as_deref(),
                senha_hash.as_deref(),
                payload.nome.as_deref().map(str::trim),
                payload.filial_id,
                payload.ativo,
            )
            .await?;

        tx.commit().await?;
        Ok(gestor)
    }

    /// Remove a conta de acesso. O cadastro do gestor cai junto (cascade).
    pub async fn delete_gestor(&self, id: i32) -> Result<(), AppError> {
        let gestor = self
            .gestor_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("gestor"))?;

        self.user_repo.delete_user(&self.pool, gestor.usuario_id).await?;
        tracing::info!("Gestor {} excluído", id);
        Ok(())
    }
}
