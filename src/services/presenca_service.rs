// src/services/presenca_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{MatriculaRepository, PresencaRepository, TurmaRepository},
    middleware::filial::FilialScope,
    models::presenca::{
        ChamadaPayload, CreatePresencaPayload, Presenca, PresencaDetalhe, PresencaFiltro, RegistroChamada,
        UpdatePresencaPayload,
    },
};

/// Primeiro aluno da chamada sem matrícula ativa na turma, se houver.
pub fn aluno_fora_da_turma(registros: &[RegistroChamada], ativos: &[i32]) -> Option<i32> {
    registros.iter().map(|r| r.aluno_id).find(|id| !ativos.contains(id))
}

#[derive(Clone)]
pub struct PresencaService {
    presenca_repo: PresencaRepository,
    matricula_repo: MatriculaRepository,
    turma_repo: TurmaRepository,
    pool: PgPool,
}

impl PresencaService {
    pub fn new(
        presenca_repo: PresencaRepository,
        matricula_repo: MatriculaRepository,
        turma_repo: TurmaRepository,
        pool: PgPool,
    ) -> Self {
        Self { presenca_repo, matricula_repo, turma_repo, pool }
    }

    pub async fn list_presencas(
        &self,
        scope: &FilialScope,
        filtro: &PresencaFiltro,
    ) -> Result<Vec<PresencaDetalhe>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.presenca_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_presenca(&self, scope: &FilialScope, id: i32) -> Result<PresencaDetalhe, AppError> {
        self.presenca_repo
            .find_detalhe(&self.pool, id)
            .await?
            .filter(|p| scope.pode_ler(p.filial_id))
            .ok_or(AppError::NotFound("presenca"))
    }

    async fn check_turma(&self, scope: &FilialScope, turma_id: i32) -> Result<(), AppError> {
        let turma = self
            .turma_repo
            .find_by_id(&self.pool, turma_id)
            .await?
            .filter(|t| scope.pode_ler(t.filial_id))
            .ok_or(AppError::NotFound("turma"))?;
        scope.garantir_escrita(turma.filial_id)
    }

    /// Registra a chamada inteira de uma turma num dia. Ou grava todos os
    /// registros ou nenhum.
    pub async fn registrar_chamada(
        &self,
        scope: &FilialScope,
        payload: &ChamadaPayload,
    ) -> Result<Vec<Presenca>, AppError> {
        self.check_turma(scope, payload.turma_id).await?;

        let aluno_ids: Vec<i32> = payload.registros.iter().map(|r| r.aluno_id).collect();

        let mut tx = self.pool.begin().await?;

        let ativos = self
            .matricula_repo
            .alunos_ativos(&mut *tx, payload.turma_id, &aluno_ids)
            .await?;
        if let Some(aluno_id) = aluno_fora_da_turma(&payload.registros, &ativos) {
            return Err(AppError::AlunoNaoMatriculado(aluno_id));
        }

        let mut presencas = Vec::with_capacity(payload.registros.len());
        for registro in &payload.registros {
            let presenca = self
                .presenca_repo
                .upsert(
                    &mut *tx,
                    registro.aluno_id,
                    payload.turma_id,
                    payload.data,
                    registro.presente,
                    registro.observacoes.as_deref(),
                )
                .await?;
            presencas.push(presenca);
        }

        tx.commit().await?;

        tracing::info!(
            "✅ Chamada da turma {} em {} registrada ({} alunos)",
            payload.turma_id,
            payload.data,
            presencas.len()
        );
        Ok(presencas)
    }

    pub async fn create_presenca(
        &self,
        scope: &FilialScope,
        payload: &CreatePresencaPayload,
    ) -> Result<Presenca, AppError> {
        self.check_turma(scope, payload.turma_id).await?;

        if !self
            .matricula_repo
            .ativa_existe(&self.pool, payload.aluno_id, payload.turma_id)
            .await?
        {
            return Err(AppError::AlunoNaoMatriculado(payload.aluno_id));
        }

        self.presenca_repo
            .upsert(
                &self.pool,
                payload.aluno_id,
                payload.turma_id,
                payload.data,
                payload.presente,
                payload.observacoes.as_deref(),
            )
            .await
    }

    pub async fn update_presenca(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdatePresencaPayload,
    ) -> Result<Presenca, AppError> {
        let atual = self.get_presenca(scope, id).await?;
        scope.garantir_escrita(atual.filial_id)?;
        self.presenca_repo.update(&self.pool, id, payload).await
    }

    pub async fn delete_presenca(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        let atual = self.get_presenca(scope, id).await?;
        scope.garantir_escrita(atual.filial_id)?;
        self.presenca_repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::services::fixtures;

    fn registro(aluno_id: i32) -> RegistroChamada {
        RegistroChamada { aluno_id, presente: true, observacoes: None }
    }

    #[test]
    fn chamada_completa_passa() {
        let registros = vec![registro(1), registro(2)];
        assert_eq!(aluno_fora_da_turma(&registros, &[2, 1, 7]), None);
    }

    #[test]
    fn aponta_o_aluno_sem_matricula() {
        let registros = vec![registro(1), registro(5), registro(9)];
        assert_eq!(aluno_fora_da_turma(&registros, &[1, 9]), Some(5));
    }

    fn service(pool: PgPool) -> PresencaService {
        PresencaService::new(
            PresencaRepository::new(),
            MatriculaRepository::new(),
            TurmaRepository::new(),
            pool,
        )
    }

    #[sqlx::test]
    async fn registrar_de_novo_sobrescreve(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, filial, 10, None).await;
        let aluno = fixtures::aluno(&pool, filial, "Caio").await;
        fixtures::matricula(&pool, aluno, turma).await;
        let service = service(pool);
        let scope = fixtures::unidade(filial);
        let data = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();

        let falta = CreatePresencaPayload { aluno_id: aluno, turma_id: turma, data, presente: false, observacoes: None };
        let primeira = service.create_presenca(&scope, &falta).await.unwrap();

        let presente = CreatePresencaPayload {
            presente: true,
            observacoes: Some("chegou atrasado".into()),
            ..falta
        };
        let segunda = service.create_presenca(&scope, &presente).await.unwrap();

        assert_eq!(segunda.id, primeira.id);
        assert!(segunda.presente);
        assert_eq!(segunda.observacoes.as_deref(), Some("chegou atrasado"));

        let filtro = PresencaFiltro { turma_id: Some(turma), ..Default::default() };
        assert_eq!(service.list_presencas(&scope, &filtro).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    async fn chamada_com_aluno_de_fora_nao_grava_nada(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let turma = fixtures::turma(&pool, filial, 10, None).await;
        let matriculado = fixtures::aluno(&pool, filial, "Caio").await;
        let avulso = fixtures::aluno(&pool, filial, "Leo").await;
        fixtures::matricula(&pool, matriculado, turma).await;
        let service = service(pool);
        let scope = fixtures::unidade(filial);

        let chamada = ChamadaPayload {
            turma_id: turma,
            data: NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
            registros: vec![registro(matriculado), registro(avulso)],
        };
        assert!(matches!(
            service.registrar_chamada(&scope, &chamada).await,
            Err(AppError::AlunoNaoMatriculado(id)) if id == avulso
        ));
        assert!(service.list_presencas(&scope, &PresencaFiltro::default()).await.unwrap().is_empty());
    }
}
