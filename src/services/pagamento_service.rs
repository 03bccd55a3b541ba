// src/services/pagamento_service.rs

use chrono::{Local, NaiveDate};
use sqlx::{PgConnection, PgPool};

use crate::{
    common::error::AppError,
    db::{AlunoRepository, ConfiguracoesRepository, PagamentoRepository},
    middleware::filial::FilialScope,
    models::{
        aluno::StatusPagamento,
        pagamento::{CreatePagamentoPayload, Pagamento, PagamentoDetalhe, PagamentoFiltro, UpdatePagamentoPayload},
    },
};

/// Mês de referência no formato gravado nos pagamentos (AAAA-MM).
pub fn mes_referencia_de(data: NaiveDate) -> String {
    data.format("%Y-%m").to_string()
}

#[derive(Clone)]
pub struct PagamentoService {
    pagamento_repo: PagamentoRepository,
    aluno_repo: AlunoRepository,
    configuracoes_repo: ConfiguracoesRepository,
    pool: PgPool,
}

impl PagamentoService {
    pub fn new(
        pagamento_repo: PagamentoRepository,
        aluno_repo: AlunoRepository,
        configuracoes_repo: ConfiguracoesRepository,
        pool: PgPool,
    ) -> Self {
        Self { pagamento_repo, aluno_repo, configuracoes_repo, pool }
    }

    pub async fn list_pagamentos(
        &self,
        scope: &FilialScope,
        filtro: &PagamentoFiltro,
    ) -> Result<Vec<PagamentoDetalhe>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.pagamento_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn get_pagamento(&self, scope: &FilialScope, id: i32) -> Result<PagamentoDetalhe, AppError> {
        self.pagamento_repo
            .find_detalhe(&self.pool, id)
            .await?
            .filter(|p| scope.pode_ler(p.pagamento.filial_id))
            .ok_or(AppError::NotFound("pagamento"))
    }

    // Recalcula o status de um aluno dentro da transação corrente
    async fn atualizar_status(&self, conn: &mut PgConnection, aluno_id: i32) -> Result<StatusPagamento, AppError> {
        let configuracoes = self.configuracoes_repo.get(&mut *conn).await?;
        let hoje = Local::now().date_naive();
        let pagou = self
            .pagamento_repo
            .pagou_mes(&mut *conn, aluno_id, &mes_referencia_de(hoje))
            .await?;

        let status = StatusPagamento::calcular(pagou, hoje, configuracoes.dia_vencimento as u32);
        self.aluno_repo.set_status_pagamento(&mut *conn, aluno_id, status).await?;
        Ok(status)
    }

    pub async fn create_pagamento(
        &self,
        scope: &FilialScope,
        payload: &CreatePagamentoPayload,
    ) -> Result<Pagamento, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava o aluno: uma transferência em curso levaria a filial antiga
        let aluno = self
            .aluno_repo
            .lock_by_id(&mut *tx, payload.aluno_id)
            .await?
            .filter(|a| scope.pode_ler(a.filial_id))
            .ok_or(AppError::NotFound("aluno"))?;
        scope.garantir_escrita(aluno.filial_id)?;

        let pagamento = self.pagamento_repo.create(&mut *tx, payload, aluno.filial_id).await?;
        let status = self.atualizar_status(&mut tx, aluno.id).await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Pagamento {} do aluno {} ({}) registrado, status {}",
            pagamento.id,
            aluno.id,
            pagamento.mes_referencia,
            status.label()
        );
        Ok(pagamento)
    }

    pub async fn update_pagamento(
        &self,
        scope: &FilialScope,
        id: i32,
        payload: &UpdatePagamentoPayload,
    ) -> Result<Pagamento, AppError> {
        let atual = self.get_pagamento(scope, id).await?;
        scope.garantir_escrita(atual.pagamento.filial_id)?;

        let mut tx = self.pool.begin().await?;
        let pagamento = self.pagamento_repo.update(&mut *tx, id, payload).await?;
        self.atualizar_status(&mut tx, pagamento.aluno_id).await?;
        tx.commit().await?;

        Ok(pagamento)
    }

    pub async fn delete_pagamento(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        let atual = self.get_pagamento(scope, id).await?;
        scope.garantir_escrita(atual.pagamento.filial_id)?;

        let mut tx = self.pool.begin().await?;
        self.pagamento_repo.delete(&mut *tx, id).await?;
        self.atualizar_status(&mut tx, atual.pagamento.aluno_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Recalcula o status de todos os alunos do escopo. Devolve quantos mudaram.
    pub async fn recalcular_status(&self, scope: &FilialScope) -> Result<u64, AppError> {
        let filial_id = scope.filtro(None)?;
        let configuracoes = self.configuracoes_repo.get(&self.pool).await?;
        let hoje = Local::now().date_naive();

        let alterados = self
            .aluno_repo
            .recalcular_status(
                &self.pool,
                filial_id,
                &mes_referencia_de(hoje),
                hoje,
                configuracoes.dia_vencimento,
            )
            .await?;

        tracing::info!("🔄 Status de pagamento recalculado: {} alunos alterados", alterados);
        Ok(alterados)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::{models::pagamento::FormaPagamento, services::fixtures};

    #[test]
    fn mes_referencia_tem_zero_a_esquerda() {
        let data = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(mes_referencia_de(data), "2025-03");

        let dezembro = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(mes_referencia_de(dezembro), "2024-12");
    }

    fn service(pool: PgPool) -> PagamentoService {
        PagamentoService::new(
            PagamentoRepository::new(),
            AlunoRepository::new(),
            ConfiguracoesRepository::new(),
            pool,
        )
    }

    fn mensalidade(aluno_id: i32, valor: Decimal) -> CreatePagamentoPayload {
        CreatePagamentoPayload {
            aluno_id,
            valor,
            mes_referencia: mes_referencia_de(Local::now().date_naive()),
            data_pagamento: None,
            forma_pagamento: FormaPagamento::Pix,
            observacoes: None,
        }
    }

    async fn status_do_aluno(pool: &PgPool, aluno_id: i32) -> StatusPagamento {
        sqlx::query_scalar("SELECT status_pagamento FROM alunos WHERE id = $1")
            .bind(aluno_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn pagamento_do_mes_recalcula_o_status(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let aluno = fixtures::aluno(&pool, filial, "Ana").await;
        let service = service(pool.clone());
        let scope = fixtures::unidade(filial);

        let pagamento = service
            .create_pagamento(&scope, &mensalidade(aluno, Decimal::new(18000, 2)))
            .await
            .unwrap();
        assert_eq!(pagamento.filial_id, filial);
        assert_eq!(status_do_aluno(&pool, aluno).await, StatusPagamento::EmDia);

        // Sem o pagamento volta para pendente ou atrasado, conforme o vencimento
        service.delete_pagamento(&scope, pagamento.id).await.unwrap();
        let dia_vencimento = ConfiguracoesRepository::new().get(&pool).await.unwrap().dia_vencimento;
        let esperado = StatusPagamento::calcular(false, Local::now().date_naive(), dia_vencimento as u32);
        assert_eq!(status_do_aluno(&pool, aluno).await, esperado);
    }

    #[sqlx::test]
    async fn recalculo_em_lote_acerta_status_desatualizado(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let aluno = fixtures::aluno(&pool, filial, "Ana").await;
        let mes = mes_referencia_de(Local::now().date_naive());
        fixtures::pagamento(&pool, aluno, filial, &mes).await;
        let service = service(pool.clone());

        // O fixture grava direto, sem passar pelo recálculo
        assert_eq!(service.recalcular_status(&fixtures::unidade(filial)).await.unwrap(), 1);
        assert_eq!(status_do_aluno(&pool, aluno).await, StatusPagamento::EmDia);
        assert_eq!(service.recalcular_status(&fixtures::unidade(filial)).await.unwrap(), 0);
    }

    #[sqlx::test]
    async fn centavo_fracionado_vira_erro_de_dado_e_nao_500(pool: PgPool) {
        let filial = fixtures::filial(&pool, "Centro").await;
        let aluno = fixtures::aluno(&pool, filial, "Ana").await;
        let service = service(pool);

        // 0.001 arredonda para 0.00 e cai no CHECK (valor > 0)
        assert!(matches!(
            service.create_pagamento(&fixtures::MATRIZ, &mensalidade(aluno, Decimal::new(1, 3))).await,
            Err(AppError::ConstraintViolation)
        ));
        assert!(matches!(
            service
                .create_pagamento(&fixtures::MATRIZ, &mensalidade(aluno, Decimal::new(10_000_000_000, 0)))
                .await,
            Err(AppError::ConstraintViolation)
        ));
    }
}
