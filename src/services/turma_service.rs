// src/services/turma_service.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::{ProfessorRepository, TurmaRepository},
    middleware::filial::FilialScope,
    models::turma::{CreateTurmaPayload, Turma, TurmaFiltro, TurmaOcupacao, UpdateTurmaPayload},
};

/// Regras de uma alteração sobre a turma travada: troca de filial só sem
/// matrículas ativas, e a capacidade nova precisa caber quem já está nela.
/// Devolve a filial que a turma terá depois da alteração.
pub fn check_alteracao(atual: &Turma, payload: &UpdateTurmaPayload, matriculados: i64) -> Result<i32, AppError> {
    let filial_id = payload.filial_id.unwrap_or(atual.filial_id);
    if filial_id != atual.filial_id && matriculados > 0 {
        return Err(AppError::FilialMismatch);
    }
    if let Some(capacidade) = payload.capacidade {
        if i64::from(capacidade) < matriculados {
            return Err(AppError::TurmaLotada { capacidade });
        }
    }
    Ok(filial_id)
}

#[derive(Clone)]
pub struct TurmaService {
    turma_repo: TurmaRepository,
    professor_repo: ProfessorRepository,
    pool: PgPool,
}

impl TurmaService {
    pub fn new(turma_repo: TurmaRepository, professor_repo: ProfessorRepository, pool: PgPool) -> Self {
        Self { turma_repo, professor_repo, pool }
    }

    pub async fn list_turmas(&self, scope: &FilialScope, filtro: &TurmaFiltro) -> Result<Vec<TurmaOcupacao>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.turma_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_turma(&self, scope: &FilialScope, id: i32) -> Result<TurmaOcupacao, AppError> {
        self.turma_repo
            .find_detalhe(&self.pool, id)
            .await?
            .filter(|t| scope.pode_ler(t.turma.filial_id))
            .ok_or(AppError::NotFound("turma"))
    }

    // O professor da turma precisa ser da mesma filial. A trava segura uma
    // troca de filial do professor até o fim da transação.
    async fn check_professor<'e, E>(&self, executor: E, professor_id: Option<i32>, filial_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let Some(professor_id) = professor_id else {
            return Ok(());
        };
        let professor = self
            .professor_repo
            .lock_by_id(executor, professor_id)
            .await?
            .ok_or(AppError::InvalidReference)?;
        if professor.filial_id != filial_id {
            return Err(AppError::FilialMismatch);
        }
        Ok(())
    }

    pub async fn create_turma(&self, scope: &FilialScope, payload: &CreateTurmaPayload) -> Result<Turma, AppError> {
        let filial_id = scope.filial_para_cadastro(payload.filial_id)?;

        let mut tx = self.pool.begin().await?;
        self.check_professor(&mut *tx, payload.professor_id, filial_id).await?;
        let turma = self.turma_repo.create(&mut *tx, payload, filial_id).await?;
        tx.commit().await?;

        tracing::info!("✅ Turma {} criada na filial {}", turma.id, filial_id);
        Ok(turma)
    }

    pub async fn update_turma(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdateTurmaPayload,
    ) -> Result<Turma, AppError> {
        let mut tx = self.pool.begin().await?;

        // Mesma trava da matrícula: ninguém entra na turma durante a alteração
        let atual = self
            .turma_repo
            .lock_by_id(&mut *tx, id)
            .await?
            .filter(|t| scope.pode_ler(t.filial_id))
            .ok_or(AppError::NotFound("turma"))?;
        scope.garantir_escrita(atual.filial_id)?;
        if let Some(nova_filial) = payload.filial_id {
            scope.garantir_escrita(nova_filial)?;
        }

        let matriculados = self.turma_repo.contar_matriculados(&mut *tx, id).await?;
        let filial_id = check_alteracao(&atual, payload, matriculados)?;

        // Vale para o professor novo e para o que já estava na turma
        self.check_professor(&mut *tx, payload.professor_id.or(atual.professor_id), filial_id)
            .await?;

        let turma = self.turma_repo.update(&mut *tx, id, payload).await?;

        tx.commit().await?;
        Ok(turma)
    }

    pub async fn delete_turma(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        self.get_turma(scope, id).await?;
        self.turma_repo.delete(&self.pool, id).await
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
            nome: "Sub-13".into(),
            categoria: None,
            horario: None,
            dias_semana: vec!["ter".into(), "qui".into()],
            capacidade,
            professor_id: Some(1),
            filial_id: 1,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(pool: PgPool) -> TurmaService {
        TurmaService::new(TurmaRepository::new(), ProfessorRepository::new(), pool)
    }

    #[test]
    fn capacidade_nova_precisa_caber_os_matriculados() {
        let payload = UpdateTurmaPayload { capacidade: Some(1), ..Default::default() };
        match check_alteracao(&turma(2), &payload, 2) {
            Err(AppError::TurmaLotada { capacidade }) => assert_eq!(capacidade, 1),
            other => panic!("esperava TurmaLotada, veio {other:?}"),
        }

        let payload = UpdateTurmaPayload { capacidade: Some(2), ..Default::default() };
        assert_eq!(check_alteracao(&turma(5), &payload, 2).unwrap(), 1);
    }

    #[test]
    fn troca_de_filial_exige_turma_vazia() {
        let payload = UpdateTurmaPayload { filial_id: Some(2), ..Default::default() };
        assert!(matches!(check_alteracao(&turma(10), &payload, 1), Err(AppError::FilialMismatch)));
        assert_eq!(check_alteracao(&turma(10), &payload, 0).unwrap(), 2);
    }

    #[sqlx::test]
    async fn nao_reduz_capacidade_abaixo_dos_matriculados(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma_id = fixtures::turma(&pool, filial, 2, None).await;
        for nome in ["Ana", "Bia"] {
            let aluno = fixtures::aluno(&pool, filial, nome).await;
            fixtures::matricula(&pool, aluno, turma_id).await;
        }
        let service = service(pool);

        let payload = UpdateTurmaPayload { capacidade: Some(1), ..Default::default() };
        let err = service.update_turma(&fixtures::MATRIZ, turma_id, &payload).await.unwrap_err();
        assert!(matches!(err, AppError::TurmaLotada { capacidade: 1 }));

        let turma = service.get_turma(&fixtures::MATRIZ, turma_id).await.unwrap();
        assert_eq!(turma.turma.capacidade, 2);
        assert_eq!(turma.matriculados, 2);
    }

    #[sqlx::test]
    async fn troca_de_filial_revalida_professor_e_matriculas(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let professor_centro = fixtures::professor(&pool, centro, "Carlos").await;
        let professor_norte = fixtures::professor(&pool, norte, "Nina").await;
        let turma_id = fixtures::turma(&pool, centro, 10, Some(professor_centro)).await;
        let service = service(pool.clone());

        // O professor atual é do Centro
        let mudar = UpdateTurmaPayload { filial_id: Some(norte), ..Default::default() };
        let err = service.update_turma(&fixtures::MATRIZ, turma_id, &mudar).await.unwrap_err();
        assert!(matches!(err, AppError::FilialMismatch));

        // Com aluno matriculado também não muda
        let aluno = fixtures::aluno(&pool, centro, "Duda").await;
        let matricula = fixtures::matricula(&pool, aluno, turma_id).await;
        let mudar_com_professor = UpdateTurmaPayload {
            filial_id: Some(norte),
            professor_id: Some(professor_norte),
            ..Default::default()
        };
        let err = service
            .update_turma(&fixtures::MATRIZ, turma_id, &mudar_com_professor)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FilialMismatch));

        // Turma vazia e professor da filial nova: passa
        sqlx::query("UPDATE matriculas SET ativo = FALSE WHERE id = $1")
            .bind(matricula)
            .execute(&pool)
            .await
            .unwrap();
        let turma = service
            .update_turma(&fixtures::MATRIZ, turma_id, &mudar_com_professor)
            .await
            .unwrap();
        assert_eq!(turma.filial_id, norte);
        assert_eq!(turma.professor_id, Some(professor_norte));
    }

    #[sqlx::test]
    async fn escopo_da_unidade_em_linhas_reais(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let norte = fixtures::filial(&pool, "Norte").await;
        let turma_centro = fixtures::turma(&pool, centro, 10, None).await;
        let turma_norte = fixtures::turma(&pool, norte, 10, None).await;
        let service = service(pool);
        let gestor_centro = fixtures::unidade(centro);

        // Turma de outra filial nem aparece
        assert!(matches!(
            service.get_turma(&gestor_centro, turma_norte).await,
            Err(AppError::NotFound("turma"))
        ));
        let payload = UpdateTurmaPayload { nome: Some("Sub-15".into()), ..Default::default() };
        assert!(matches!(
            service.update_turma(&gestor_centro, turma_norte, &payload).await,
            Err(AppError::NotFound("turma"))
        ));

        // Mandar a própria turma para outra filial é 403
        let mudar = UpdateTurmaPayload { filial_id: Some(norte), ..Default::default() };
        assert!(matches!(
            service.update_turma(&gestor_centro, turma_centro, &mudar).await,
            Err(AppError::FilialForbidden)
        ));

        let listadas = service.list_turmas(&gestor_centro, &TurmaFiltro::default()).await.unwrap();
        assert_eq!(listadas.len(), 1);
        assert_eq!(listadas[0].turma.id, turma_centro);
    }

    #[sqlx::test]
    async fn listagem_reflete_cadastro_alteracao_e_filtros(pool: PgPool) {
        let centro = fixtures::filial(&pool, "Centro").await;
        let professor = fixtures::professor(&pool, centro, "Carlos Mendes").await;
        let service = service(pool);
        let scope = fixtures::unidade(centro);

        let criar = |nome: &str, categoria: &str| CreateTurmaPayload {
            nome: nome.into(),
            categoria: Some(categoria.into()),
            horario: Some("16:00-17:30".into()),
            dias_semana: vec!["seg".into(), "qua".into()],
            capacidade: 15,
            professor_id: Some(professor),
            filial_id: None,
            ativo: None,
        };
        let sub9 = service.create_turma(&scope, &criar("Sub-9 Tarde", "Sub-9")).await.unwrap();
        service.create_turma(&scope, &criar("Sub-11 Manhã", "Sub-11")).await.unwrap();

        let renomear = UpdateTurmaPayload { nome: Some("Sub-9 Noite".into()), ..Default::default() };
        service.update_turma(&scope, sub9.id, &renomear).await.unwrap();

        let todas = service.list_turmas(&scope, &TurmaFiltro::default()).await.unwrap();
        let nomes: Vec<_> = todas.iter().map(|t| t.turma.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Sub-11 Manhã", "Sub-9 Noite"]);

        let por_categoria = TurmaFiltro { categoria: Some("Sub-9".into()), ..Default::default() };
        let filtradas = service.list_turmas(&scope, &por_categoria).await.unwrap();
        assert_eq!(filtradas.len(), 1);
        assert_eq!(filtradas[0].turma.id, sub9.id);

        // A busca também olha o nome do professor
        let por_professor = TurmaFiltro { busca: Some("mendes".into()), ..Default::default() };
        assert_eq!(service.list_turmas(&scope, &por_professor).await.unwrap().len(), 2);

        service.delete_turma(&scope, sub9.id).await.unwrap();
        assert_eq!(service.list_turmas(&scope, &TurmaFiltro::default()).await.unwrap().len(), 1);
    }
}
