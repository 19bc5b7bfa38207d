//! Renders outbound webservice payloads.
//!
//! One function per operation, each serializing a total struct into the
//! gateway's XML dialect. A required wire field without a value is
//! unrepresentable here: whatever a `TransactionRequest` carries is
//! renderable.

use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Merchant;
use crate::core::error::{CieloError, Result};
use crate::core::money;
use crate::modules::transactions::models::request::{
    PaymentSource, RawCardData, TransactionRequest,
};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>";
const NAMESPACE: &str = "http://ecommerce.cbmp.com.br";
const VERSION: &str = "1.2.1";

/// ISO 4217 numeric code for BRL, the only currency the service settles
const CURRENCY: &str = "986";

/// Security code informed by the cardholder
const CVV_INFORMED: &str = "1";

/// Authorize only after cardholder authentication (redirect flow)
const AUTHORIZE_AUTHENTICATED: &str = "2";
/// Authorize directly, without authentication
const AUTHORIZE_DIRECT: &str = "3";

#[derive(Serialize)]
struct DadosEc<'a> {
    numero: &'a str,
    chave: &'a str,
}

impl<'a> DadosEc<'a> {
    fn from(merchant: &'a Merchant) -> Self {
        Self {
            numero: &merchant.affiliation_id,
            chave: &merchant.api_key,
        }
    }
}

#[derive(Serialize)]
struct DadosPortadorCartao<'a> {
    numero: &'a str,
    validade: String,
    indicador: &'static str,
    #[serde(rename = "codigo-seguranca")]
    codigo_seguranca: &'a str,
    #[serde(rename = "nome-portador")]
    nome_portador: &'a str,
}

impl<'a> DadosPortadorCartao<'a> {
    fn from(card: &'a RawCardData) -> Self {
        Self {
            numero: card.number(),
            validade: card.expiration(),
            indicador: CVV_INFORMED,
            codigo_seguranca: card.security_code(),
            nome_portador: card.holder_name(),
        }
    }
}

#[derive(Serialize)]
struct DadosPortadorToken<'a> {
    token: &'a str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum DadosPortador<'a> {
    Cartao(DadosPortadorCartao<'a>),
    Token(DadosPortadorToken<'a>),
}

#[derive(Serialize)]
struct DadosPedido<'a> {
    numero: &'a str,
    valor: String,
    moeda: &'static str,
    #[serde(rename = "data-hora")]
    data_hora: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    descricao: Option<&'a str>,
}

#[derive(Serialize)]
struct FormaPagamento<'a> {
    bandeira: &'a str,
    produto: &'static str,
    parcelas: u32,
}

#[derive(Serialize)]
struct RequisicaoTransacao<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@versao")]
    versao: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "dados-ec")]
    dados_ec: DadosEc<'a>,
    #[serde(rename = "dados-portador")]
    dados_portador: DadosPortador<'a>,
    #[serde(rename = "dados-pedido")]
    dados_pedido: DadosPedido<'a>,
    #[serde(rename = "forma-pagamento")]
    forma_pagamento: FormaPagamento<'a>,
    #[serde(rename = "url-retorno", skip_serializing_if = "Option::is_none")]
    url_retorno: Option<&'a str>,
    autorizar: &'static str,
    capturar: bool,
    #[serde(rename = "gerar-token")]
    gerar_token: bool,
}

#[derive(Serialize)]
struct RequisicaoCaptura<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@versao")]
    versao: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    tid: &'a str,
    #[serde(rename = "dados-ec")]
    dados_ec: DadosEc<'a>,
}

#[derive(Serialize)]
struct RequisicaoCancelamento<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@versao")]
    versao: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    tid: &'a str,
    #[serde(rename = "dados-ec")]
    dados_ec: DadosEc<'a>,
    valor: String,
}

#[derive(Serialize)]
struct RequisicaoConsulta<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@versao")]
    versao: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    tid: &'a str,
    #[serde(rename = "dados-ec")]
    dados_ec: DadosEc<'a>,
}

#[derive(Serialize)]
struct DadosPortadorTokenizacao<'a> {
    numero: &'a str,
    validade: String,
    #[serde(rename = "nome-portador")]
    nome_portador: &'a str,
}

#[derive(Serialize)]
struct RequisicaoToken<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@versao")]
    versao: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "dados-ec")]
    dados_ec: DadosEc<'a>,
    #[serde(rename = "dados-portador")]
    dados_portador: DadosPortadorTokenizacao<'a>,
}

/// Renders the authorization request for a card or token payment
pub fn authorize(merchant: &Merchant, request: &TransactionRequest) -> Result<String> {
    let dados_portador = match &request.source {
        PaymentSource::RawCard(card) => DadosPortador::Cartao(DadosPortadorCartao::from(card)),
        PaymentSource::Token(token) => DadosPortador::Token(DadosPortadorToken {
            token: &token.token,
        }),
    };

    // authenticate first whenever the caller gave the cardholder a way back
    let autorizar = if request.terms.return_url.is_some() {
        AUTHORIZE_AUTHENTICATED
    } else {
        AUTHORIZE_DIRECT
    };

    let message = RequisicaoTransacao {
        id: &request.order.id,
        versao: VERSION,
        xmlns: NAMESPACE,
        dados_ec: DadosEc::from(merchant),
        dados_portador,
        dados_pedido: DadosPedido {
            numero: &request.order.id,
            valor: money::to_cents(request.order.total)?,
            moeda: CURRENCY,
            data_hora: timestamp(),
            descricao: request.order.description.as_deref(),
        },
        forma_pagamento: FormaPagamento {
            bandeira: request.terms.brand.as_str(),
            produto: request.terms.kind.wire_code(),
            parcelas: request.terms.installments,
        },
        url_retorno: request.terms.return_url.as_deref(),
        autorizar,
        capturar: request.terms.capture,
        gerar_token: request.terms.tokenize,
    };

    render("requisicao-transacao", &message)
}

/// Renders the capture request for an authorized transaction
pub fn capture(merchant: &Merchant, tid: &str) -> Result<String> {
    let message = RequisicaoCaptura {
        id: tid,
        versao: VERSION,
        xmlns: NAMESPACE,
        tid,
        dados_ec: DadosEc::from(merchant),
    };
    render("requisicao-captura", &message)
}

/// Renders the full or partial cancellation request
pub fn cancel(merchant: &Merchant, tid: &str, amount: Decimal) -> Result<String> {
    let message = RequisicaoCancelamento {
        id: tid,
        versao: VERSION,
        xmlns: NAMESPACE,
        tid,
        dados_ec: DadosEc::from(merchant),
        valor: money::to_cents(amount)?,
    };
    render("requisicao-cancelamento", &message)
}

/// Renders the read-only status query
pub fn query(merchant: &Merchant, tid: &str) -> Result<String> {
    let message = RequisicaoConsulta {
        id: tid,
        versao: VERSION,
        xmlns: NAMESPACE,
        tid,
        dados_ec: DadosEc::from(merchant),
    };
    render("requisicao-consulta", &message)
}

/// Renders the card tokenization request
pub fn tokenize(merchant: &Merchant, card: &RawCardData) -> Result<String> {
    let id = Local::now().format("%Y%m%d%H%M%S%3f").to_string();
    let message = RequisicaoToken {
        id: &id,
        versao: VERSION,
        xmlns: NAMESPACE,
        dados_ec: DadosEc::from(merchant),
        dados_portador: DadosPortadorTokenizacao {
            numero: card.number(),
            validade: card.expiration(),
            nome_portador: card.holder_name(),
        },
    };
    render("requisicao-token", &message)
}

fn render<T: Serialize>(root: &str, message: &T) -> Result<String> {
    let xml = quick_xml::se::to_string_with_root(root, message)
        .map_err(|e| CieloError::internal(format!("failed to render {}: {}", root, e)))?;
    Ok(format!("{}{}", XML_DECLARATION, xml))
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
