// src/services/matricula_service.rs

use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::AppError,
    db::{AlunoRepository, MatriculaRepository, TurmaRepository},
    middleware::filial::FilialScope,
    models::{
        matricula::{CreateMatriculaPayload, Matricula, MatriculaDetalhe, MatriculaFiltro},
        turma::Turma,
    },
};

/// Falha se a turma estiver inativa ou com todas as vagas ocupadas.
pub fn check_vagas(turma: &Turma, matriculados: i64) -> Result<(), AppError> {
    if !turma.ativo {
        return Err(AppError::Conflict("turma_inativa"));
    }
    if matriculados >= i64::from(turma.capacidade) {
        return Err(AppError::TurmaLotada { capacidade: turma.capacidade });
    }
    Ok(())
}

#[derive(Clone)]
pub struct MatriculaService {
    matricula_repo: MatriculaRepository,
    turma_repo: TurmaRepository,
    aluno_repo: AlunoRepository,
    pool: PgPool,
}

impl MatriculaService {
    pub fn new(
        matricula_repo: MatriculaRepository,
        turma_repo: TurmaRepository,
        aluno_repo: AlunoRepository,
        pool: PgPool,
    ) -> Self {
        Self { matricula_repo, turma_repo, aluno_repo, pool }
    }

    pub async fn list_matriculas(
        &self,
        scope: &FilialScope,
        filtro: &MatriculaFiltro,
    ) -> Result<Vec<MatriculaDetalhe>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.matricula_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_matricula(&self, scope: &FilialScope, id: i32) -> Result<MatriculaDetalhe, AppError> {
        self.matricula_repo
            .find_detalhe(&self.pool, id)
            .await?
            .filter(|m| scope.pode_ler(m.filial_id))
            .ok_or(AppError::NotFound("matricula"))
    }

    // Trava a linha da turma até o fim da transação
    async fn lock_turma(&self, conn: &mut PgConnection, scope: &FilialScope, turma_id: i32) -> Result<Turma, AppError> {
        self.turma_repo
            .lock_by_id(&mut *conn, turma_id)
            .await?
            .filter(|t| scope.pode_ler(t.filial_id))
            .ok_or(AppError::NotFound("turma"))
    }

    pub async fn create_matricula(
        &self,
        scope: &FilialScope,
        payload: &CreateMatriculaPayload,
    ) -> Result<Matricula, AppError> {
        let mut tx = self.pool.begin().await?;

        let turma = self.lock_turma(&mut tx, scope, payload.turma_id).await?;
        scope.garantir_escrita(turma.filial_id)?;

        let aluno = self
            .aluno_repo
            .lock_by_id(&mut *tx, payload.aluno_id)
            .await?
            .filter(|a| scope.pode_ler(a.filial_id))
            .ok_or(AppError::NotFound("aluno"))?;

        if aluno.filial_id != turma.filial_id {
            return Err(AppError::FilialMismatch);
        }

        let matriculados = self.turma_repo.contar_matriculados(&mut *tx, turma.id).await?;
        check_vagas(&turma, matriculados)?;

        let matricula = self
            .matricula_repo
            .create(&mut *tx, aluno.id, turma.id, payload.data_matricula)
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Aluno {} matriculado na turma {}", aluno.id, turma.id);
        Ok(matricula)
    }

    /// Ativa ou desativa a matrícula. Reativar ocupa vaga de novo.
    pub async fn set_ativo(&self, scope: &FilialScope, id: i32, ativo: bool) -> Result<Matricula, AppError> {
        let atual = self.get_matricula(scope, id).await?;
        scope.garantir_escrita(atual.filial_id)?;

        let mut tx = self.pool.begin().await?;

        if ativo && !atual.matricula.ativo {
            let turma = self.lock_turma(&mut tx, scope, atual.matricula.turma_id).await?;
            let matriculados = self.turma_repo.contar_matriculados(&mut *tx, turma.id).await?;
            check_vagas(&turma, matriculados)?;
        }

        let matricula = self.matricula_repo.set_ativo(&mut *tx, id, ativo).await?;

        tx.commit().await?;
        Ok(matricula)
    }

    pub async fn delete_matricula(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        let atual = self.get_matricula(scope, id).await?;
        scope.garantir_escrita(atual.filial_id)?;
        self.matricula_repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::services::fixtures;

    fn turma(capacidade: i32) -> Turma {
        Turma {
            id: 1,
            nome: "Sub-11".into(),
            categoria: None,
            horario: None,
            dias_semana: vec!["seg".into()],
            capacidade,
            professor_id: None,
            filial_id: 1,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn aceita_enquanto_houver_vaga() {
        assert!(check_vagas(&turma(20), 19).is_ok());
        assert!(check_vagas(&turma(1), 0).is_ok());
    }

    #[test]
    fn recusa_turma_inativa_mesmo_com_vaga() {
        let fechada = Turma { ativo: false, ..turma(20) };
        assert!(matches!(check_vagas(&fechada, 0), Err(AppError::Conflict("turma_inativa"))));
    }

    #[test]
    fn recusa_turma_lotada() {
        match check_vagas(&turma(20), 20) {
            Err(AppError::TurmaLotada { capacidade }) => assert_eq!(capacidade, 20),
            other => panic!("esperava TurmaLotada, veio {other:?}"),
        }
    }

    fn service(pool: PgPool) -> MatriculaService {
        MatriculaService::new(
            MatriculaRepository::new(),
            TurmaRepository::new(),
            AlunoRepository::new(),
            pool,
        )
    }

    fn payload(aluno_id: i32, turma_id: i32) -> CreateMatriculaPayload {
        CreateMatriculaPayload { aluno_id, turma_id, data_matricula: None }
    }

    #[sqlx::test]
    async fn matriculas_concorrentes_respeitam_a_capacidade(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, filial, 2, None).await;
        let mut alunos = Vec::new();
        for nome in ["Ana", "Bia", "Caio", "Duda", "Enzo"] {
            alunos.push(fixtures::aluno(&pool, filial, nome).await);
        }
        let service = service(pool);

        let tentativas = alunos.iter().map(|&aluno| {
            let service = service.clone();
            tokio::spawn(async move { service.create_matricula(&fixtures::MATRIZ, &payload(aluno, turma)).await })
        });
        let mut aceitas = 0;
        let mut lotadas = 0;
        for tentativa in tentativas.collect::<Vec<_>>() {
            match tentativa.await.unwrap() {
                Ok(_) => aceitas += 1,
                Err(AppError::TurmaLotada { capacidade: 2 }) => lotadas += 1,
                Err(other) => panic!("erro inesperado: {other:?}"),
            }
        }

        assert_eq!((aceitas, lotadas), (2, 3));
    }

    #[sqlx::test]
    async fn turma_inativa_nao_recebe_matricula(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, filial, 10, None).await;
        let aluno = fixtures::aluno(&pool, filial, "Ana").await;
        sqlx::query("UPDATE turmas SET ativo = FALSE WHERE id = $1")
            .bind(turma)
            .execute(&pool)
            .await
            .unwrap();
        let service = service(pool);

        assert!(matches!(
            service.create_matricula(&fixtures::MATRIZ, &payload(aluno, turma)).await,
            Err(AppError::Conflict("turma_inativa"))
        ));
    }

    #[sqlx::test]
    async fn aluno_de_outra_filial_nao_entra_na_turma(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let turma = fixtures::turma(&pool, centro, 10, None).await;
        let aluno = fixtures::aluno(&pool, norte, "Rafa").await;
        let service = service(pool);

        assert!(matches!(
            service.create_matricula(&fixtures::MATRIZ, &payload(aluno, turma)).await,
            Err(AppError::FilialMismatch)
        ));
        // Para a unidade do Centro o aluno do Norte nem existe
        assert!(matches!(
            service.create_matricula(&fixtures::unidade(centro), &payload(aluno, turma)).await,
            Err(AppError::NotFound("aluno"))
        ));
    }

    #[sqlx::test]
    async fn reativar_ocupa_vaga_de_novo(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, filial, 1, None).await;
        let ana = fixtures::aluno(&pool, filial, "Ana").await;
        let bia = fixtures::aluno(&pool, filial, "Bia").await;
        let service = service(pool);

        let primeira = service.create_matricula(&fixtures::MATRIZ, &payload(ana, turma)).await.unwrap();
        service.set_ativo(&fixtures::MATRIZ, primeira.id, false).await.unwrap();
        service.create_matricula(&fixtures::MATRIZ, &payload(bia, turma)).await.unwrap();

        assert!(matches!(
            service.set_ativo(&fixtures::MATRIZ, primeira.id, true).await,
            Err(AppError::TurmaLotada { capacidade: 1 })
        ));
    }
}
