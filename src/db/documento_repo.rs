// src/db/documento_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::documento::{Documento, DocumentoArquivo, DocumentoFiltro},
};

// Nunca traz o conteúdo na listagem
const COLUNAS_METADADOS: &str =
    "id, chave, filial_id, aluno_id, nome, tipo, mime_type, tamanho, created_at";

#[derive(Clone, Default)]
pub struct DocumentoRepository;

impl DocumentoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &DocumentoFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(COLUNAS_METADADOS).push(" FROM documentos WHERE 1=1");
        push_busca(&mut qb, &["nome", "tipo"], filtro.busca.as_deref());
        push_eq(&mut qb, "aluno_id", filtro.aluno_id);
        push_eq(&mut qb, "filial_id", filial_id);
        qb.push(" ORDER BY created_at DESC");

        let documentos = qb.build_query_as::<Documento>().fetch_all(executor).await?;
        Ok(documentos)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM documentos WHERE id = $1", COLUNAS_METADADOS);
        let documento = sqlx::query_as::<_, Documento>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(documento)
    }

    pub async fn find_arquivo<'e, E>(&self, executor: E, chave: Uuid) -> Result<Option<DocumentoArquivo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let arquivo = sqlx::query_as::<_, DocumentoArquivo>(
            "SELECT nome, mime_type, filial_id, conteudo FROM documentos WHERE chave = $1",
        )
        .bind(chave)
        .fetch_optional(executor)
        .await?;
        Ok(arquivo)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        filial_id: i32,
        aluno_id: Option<i32>,
        nome: &str,
        tipo: Option<&str>,
        mime_type: &str,
        conteudo: &[u8],
    ) -> Result<Documento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO documentos (chave, filial_id, aluno_id, nome, tipo, mime_type, tamanho, conteudo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            COLUNAS_METADADOS
        );
        let documento = sqlx::query_as::<_, Documento>(&sql)
            .bind(Uuid::new_v4())
            .bind(filial_id)
            .bind(aluno_id)
            .bind(nome)
            .bind(tipo)
            .bind(mime_type)
            .bind(conteudo.len() as i64)
            .bind(conteudo)
            .fetch_one(executor)
            .await
            .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(documento)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM documentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("documento"));
        }
        Ok(())
    }
}
