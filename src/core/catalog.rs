//! Gateway error message catalog.
//!
//! The webservice reports failures with a 3-digit code and a free-form
//! message. The catalog carries the gateway's published Portuguese
//! descriptions for the known codes; unknown codes fall back to the
//! message embedded in the response so no information is lost.

/// Returns the published description for a known gateway error code
pub fn describe(code: &str) -> Option<&'static str> {
    let text = match code {
        "001" => "A mensagem XML está fora do formato especificado pelo arquivo ecommerce.xsd (001-Mensagem inválida)",
        "002" => "Impossibilidade de autenticar uma requisição da loja virtual. (002-Credenciais inválidas)",
        "003" => "Não existe transação para o identificador informado. (003-Transação inexistente)",
        "010" => "A transação, com ou sem cartão, está divergente com a permissão do envio dessa informação. (010-Inconsistência no envio do cartão)",
        "011" => "A transação está configurada com uma modalidade de pagamento não habilitada para a loja. (011-Modalidade não habilitada)",
        "012" => "O número de parcelas solicitado ultrapassa o máximo permitido. (012-Número de parcelas inválido)",
        "019" => "A URL de Retorno é obrigatória, exceto para recorrência e autorização direta.",
        "020" => "Não é permitido realizar autorização para o status da transação. (020-Status não permite autorização)",
        "021" => "Não é permitido realizar autorização, pois o prazo está vencido. (021-Prazo de autorização vencido)",
        "022" => "EC não possui permissão para realizar a autorização. (022-EC não autorizado)",
        "030" => "A captura não pode ser realizada, pois a transação não está autorizada. (030-Transação não autorizada para captura)",
        "031" => "A captura não pode ser realizada, pois o prazo para captura está vencido. (031-Prazo de captura vencido)",
        "032" => "O valor solicitado para captura não é válido. (032-Valor de captura inválido)",
        "033" => "Não foi possível realizar a captura. (033-Falha ao capturar)",
        "040" => "O cancelamento não pode ser realizado, pois o prazo está vencido. (040-Prazo de cancelamento vencido)",
        "041" => "O atual status da transação não permite cancelamento. (041-Status não permite cancelamento)",
        "042" => "Não foi possível realizar o cancelamento. (042-Falha ao cancelar)",
        "043" => "O valor solicitado para cancelamento ultrapassa o valor capturado. (043-Valor de cancelamento inválido)",
        "099" => "Falha no sistema. (099-Erro inesperado)",
        _ => return None,
    };
    Some(text)
}

/// Resolves the caller-facing message for a gateway error: the catalog
/// text when the code is known, otherwise the gateway's own message
pub fn resolve(code: &str, gateway_message: &str) -> String {
    describe(code)
        .map(str::to_string)
        .unwrap_or_else(|| gateway_message.to_string())
}
