// src/services/documento_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AlunoRepository, DocumentoRepository},
    middleware::filial::FilialScope,
    models::documento::{Documento, DocumentoArquivo, DocumentoFiltro, NovoDocumento, MAX_DOCUMENTO_BYTES},
};

const MIME_PADRAO: &str = "application/octet-stream";

/// Nome e tipo MIME definitivos de um upload. Recusa arquivo vazio ou
/// acima do limite.
pub fn preparar_upload(novo: &NovoDocumento) -> Result<(String, String), AppError> {
    if novo.conteudo.is_empty() {
        return Err(AppError::InvalidUpload("arquivo vazio".into()));
    }
    if novo.conteudo.len() > MAX_DOCUMENTO_BYTES {
        return Err(AppError::InvalidUpload(format!(
            "arquivo maior que {} MB",
            MAX_DOCUMENTO_BYTES / (1024 * 1024)
        )));
    }

    let nome = [novo.nome.as_deref(), novo.file_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidUpload("nome do arquivo ausente".into()))?;

    let mime_type = novo
        .mime_type
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(MIME_PADRAO);

    Ok((nome.to_string(), mime_type.to_string()))
}

#[derive(Clone)]
pub struct DocumentoService {
    documento_repo: DocumentoRepository,
    aluno_repo: AlunoRepository,
    pool: PgPool,
}

impl DocumentoService {
    pub fn new(documento_repo: DocumentoRepository, aluno_repo: AlunoRepository, pool: PgPool) -> Self {
        Self { documento_repo, aluno_repo, pool }
    }

    pub async fn list_documentos(
        &self,
        scope: &FilialScope,
        filtro: &DocumentoFiltro,
    ) -> Result<Vec<Documento>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        self.documento_repo.list(&self.pool, filtro, filial_id).await
    }

    pub async fn upload(&self, scope: &FilialScope, novo: NovoDocumento) -> Result<Documento, AppError> {
        let (nome, mime_type) = preparar_upload(&novo)?;

        // Documento de aluno fica na filial do aluno
        let filial_id = match novo.aluno_id {
            Some(aluno_id) => {
                let aluno = self
                    .aluno_repo
                    .find_by_id(&self.pool, aluno_id)
                    .await?
                    .filter(|a| scope.pode_ler(a.filial_id))
                    .ok_or(AppError::NotFound("aluno"))?;
                if novo.filial_id.is_some_and(|f| f != aluno.filial_id) {
                    return Err(AppError::FilialMismatch);
                }
                scope.garantir_escrita(aluno.filial_id)?;
                aluno.filial_id
            }
            None => scope.filial_para_cadastro(novo.filial_id)?,
        };

        let documento = self
            .documento_repo
            .create(
                &self.pool,
                filial_id,
                novo.aluno_id,
                &nome,
                novo.tipo.as_deref(),
                &mime_type,
                &novo.conteudo,
            )
            .await?;

        tracing::info!(
            "✅ Documento {} enviado para a filial {} ({} bytes)",
            documento.chave,
            filial_id,
            documento.tamanho
        );
        Ok(documento)
    }

    pub async fn download(&self, scope: &FilialScope, chave: Uuid) -> Result<DocumentoArquivo, AppError> {
        self.documento_repo
            .find_arquivo(&self.pool, chave)
            .await?
            .filter(|d| scope.pode_ler(d.filial_id))
            .ok_or(AppError::NotFound("documento"))
    }

    pub async fn delete_documento(&self, scope: &FilialScope, id: i32) -> Result<(), AppError> {
        let documento = self
            .documento_repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|d| scope.pode_ler(d.filial_id))
            .ok_or(AppError::NotFound("documento"))?;
        scope.garantir_escrita(documento.filial_id)?;

        self.documento_repo.delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(conteudo: Vec<u8>) -> NovoDocumento {
        NovoDocumento {
            file_name: Some("atestado.pdf".into()),
            mime_type: Some("application/pdf".into()),
            conteudo,
            ..Default::default()
        }
    }

    #[test]
    fn nome_do_formulario_tem_prioridade() {
        let mut novo = upload(b"%PDF".to_vec());
        novo.nome = Some("  Atestado março ".into());
        let (nome, mime) = preparar_upload(&novo).unwrap();
        assert_eq!(nome, "Atestado março");
        assert_eq!(mime, "application/pdf");
    }

    #[test]
    fn usa_nome_do_arquivo_e_mime_padrao() {
        let mut novo = upload(b"abc".to_vec());
        novo.nome = Some("   ".into());
        novo.mime_type = None;
        let (nome, mime) = preparar_upload(&novo).unwrap();
        assert_eq!(nome, "atestado.pdf");
        assert_eq!(mime, MIME_PADRAO);
    }

    #[test]
    fn recusa_vazio_e_grande_demais() {
        assert!(matches!(preparar_upload(&upload(vec![])), Err(AppError::InvalidUpload(_))));

        let grande = upload(vec![0u8; MAX_DOCUMENTO_BYTES + 1]);
        assert!(matches!(preparar_upload(&grande), Err(AppError::InvalidUpload(_))));

        let limite = upload(vec![0u8; MAX_DOCUMENTO_BYTES]);
        assert!(preparar_upload(&limite).is_ok());
    }

    #[test]
    fn sem_nome_nenhum_e_invalido() {
        let mut novo = upload(b"abc".to_vec());
        novo.file_name = None;
        assert!(matches!(preparar_upload(&novo), Err(AppError::InvalidUpload(_))));
    }
}
