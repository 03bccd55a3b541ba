// src/services/filial_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{FilialRepository, UserRepository},
    middleware::filial::FilialScope,
    models::{
        auth::Papel,
        filial::{
            CreateFilialPayload, Filial, FilialFiltro, SyncState, SyncStatus, UpdateFilialPayload,
        },
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct FilialService {
    filial_repo: FilialRepository,
    user_repo: UserRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl FilialService {
    pub fn new(filial_repo: FilialRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { filial_repo, user_repo, pool }
    }

    pub async fn list_filiais(&self, scope: &FilialScope, filtro: &FilialFiltro) -> Result<Vec<Filial>, AppError> {
        let somente = scope.filtro(None)?;
        self.filial_repo.list(&self.pool, filtro, somente).await
    }

    pub async fn get_filial(&self, scope: &FilialScope, id: i32) -> Result<Filial, AppError> {
        self.filial_repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|f| scope.pode_ler(f.id))
            .ok_or(AppError::NotFound("filial"))
    }

    /// Cria a filial e, se vierem e-mail e senha, a conta do portal dela,
    /// tudo na mesma transação.
    pub async fn create_filial(&self, payload: &CreateFilialPayload) -> Result<Filial, AppError> {
        // Hash fora da transação: não toca no banco
        let senha_hash = match &payload.senha {
            Some(senha) => Some(hash_password(senha).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let filial = self.filial_repo.create(&mut *tx, payload).await?;

        if let (Some(login_email), Some(senha_hash)) = (&payload.login_email, &senha_hash) {
            self.user_repo
                .create_user(&mut *tx, login_email, senha_hash, &filial.nome, Papel::Filial, Some(filial.id))
                .await?;
        }

        tx.commit().await?;

        tracing::info!("✅ Filial {} criada: {}", filial.id, filial.nome);
        Ok(filial)
    }

    pub async fn update_filial(&self, id: i32, payload: &UpdateFilialPayload) -> Result<Filial, AppError> {
        let senha_hash = match &payload.senha {
            Some(senha) => Some(hash_password(senha).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let filial = self.filial_repo.update(&mut *tx, id, payload).await?;

        // Credencial do portal acompanha o cadastro
        if payload.login_email.is_some() || senha_hash.is_some() {
            match self.user_repo.find_portal_user(&mut *tx, id).await? {
                Some(portal) => {
                    self.user_repo
                        .update_user(
                            &mut *tx,
                            portal.id,
                            payload.login_email.as_deref(),
                            senha_hash.as_deref(),
                            None,
                            None,
                            None,
                        )
                        .await?;
                }
                None => {
                    // Só dá para criar a conta com e-mail e senha em mãos
                    if let (Some(login_email), Some(senha_hash)) = (&filial.login_email, &senha_hash) {
                        self.user_repo
                            .create_user(&mut *tx, login_email, senha_hash, &filial.nome, Papel::Filial, Some(id))
                            .await?;
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(filial)
    }

    pub async fn delete_filial(&self, id: i32) -> Result<(), AppError> {
        self.filial_repo.delete(&self.pool, id).await?;
        tracing::info!("Filial {} excluída", id);
        Ok(())
    }

    // ---
    // Sincronização
    // ---

    pub async fn sync_status(&self, scope: &FilialScope, id: i32) -> Result<SyncStatus, AppError> {
        let filial = self.get_filial(scope, id).await?;
        self.montar_status(&filial).await
    }

    pub async fn sincronizar(&self, scope: &FilialScope, id: i32) -> Result<SyncStatus, AppError> {
        // Garante 404 fora do escopo antes de escrever
        self.get_filial(scope, id).await?;

        let filial = self.filial_repo.marcar_sincronizada(&self.pool, id).await?;
        tracing::info!("🔄 Filial {} marcada como sincronizada", id);
        self.montar_status(&filial).await
    }

    async fn montar_status(&self, filial: &Filial) -> Result<SyncStatus, AppError> {
        let ultima_alteracao = self.filial_repo.ultima_alteracao(&self.pool, filial.id).await?;
        let totais = self.filial_repo.totais(&self.pool, filial.id).await?;

        Ok(SyncStatus {
            filial_id: filial.id,
            status: SyncState::from_timestamps(filial.ultima_sincronizacao, ultima_alteracao),
            ultima_sincronizacao: filial.ultima_sincronizacao,
            ultima_alteracao,
            totais,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::fixtures;

    fn service(pool: PgPool) -> FilialService {
        FilialService::new(FilialRepository::new(), UserRepository::new(pool.clone()), pool)
    }

    #[sqlx::test]
    async fn status_acompanha_cadastro_e_sincronizacao(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let service = service(pool.clone());

        let status = service.sync_status(&fixtures::MATRIZ, centro).await.unwrap();
        assert_eq!(status.status, SyncState::Nunca);

        fixtures::aluno(&pool, centro, "Ana").await;
        let status = service.sincronizar(&fixtures::MATRIZ, centro).await.unwrap();
        assert_eq!(status.status, SyncState::Sincronizado);
        assert_eq!(status.totais.alunos, 1);

        fixtures::professor(&pool, centro, "Carlos").await;
        let status = service.sync_status(&fixtures::MATRIZ, centro).await.unwrap();
        assert_eq!(status.status, SyncState::Pendente);
        assert_eq!(status.totais.professores, 1);
    }

    #[sqlx::test]
    async fn remocao_tambem_deixa_a_filial_pendente(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let ana = fixtures::aluno(&pool, centro, "Ana").await;
        let bia = fixtures::aluno(&pool, centro, "Bia").await;
        let service = service(pool.clone());

        service.sincronizar(&fixtures::MATRIZ, centro).await.unwrap();
        sqlx::query("DELETE FROM alunos WHERE id = $1").bind(ana).execute(&pool).await.unwrap();

        let status = service.sync_status(&fixtures::MATRIZ, centro).await.unwrap();
        assert_eq!(status.status, SyncState::Pendente);
        assert_eq!(status.totais.alunos, 1);

        // Transferência conta como saída da filial de origem
        service.sincronizar(&fixtures::MATRIZ, centro).await.unwrap();
        sqlx::query("UPDATE alunos SET filial_id = $2 WHERE id = $1")
            .bind(bia)
            .bind(norte)
            .execute(&pool)
            .await
            .unwrap();
        let status = service.sync_status(&fixtures::MATRIZ, centro).await.unwrap();
        assert_eq!(status.status, SyncState::Pendente);
    }

    #[sqlx::test]
    async fn unidade_nao_consulta_outra_filial(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let service = service(pool);

        assert!(matches!(
            service.sync_status(&fixtures::unidade(centro), norte).await,
            Err(AppError::NotFound("filial"))
        ));
        assert!(service.sync_status(&fixtures::unidade(centro), centro).await.is_ok());
    }
}
