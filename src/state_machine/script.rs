//! Bot copy and option labels
//!
//! Option labels double as the transition keys, so they must stay
//! byte-for-byte identical to what the menus offer.

use super::state::SessionData;
use crate::protocol::ProtocolNumber;

pub const CERTIFICATE_TYPES: &[&str] = &[
    "AVCB - Auto de Vistoria do Corpo de Bombeiros",
    "CLCB - Certificado de Licenciamento do Corpo de Bombeiros",
    "Projeto Técnico de Segurança Contra Incêndio",
    "Vistoria Técnica",
];

pub const BUILDING_TYPES: &[&str] = &["Residencial", "Comercial", "Industrial", "Misto", "Outro"];

pub const VISIT_TIMES: &[&str] = &[
    "08:00 - 10:00",
    "10:00 - 12:00",
    "14:00 - 16:00",
    "16:00 - 18:00",
];

pub const CONTACT_TIMES: &[&str] = &["Manhã (8h-12h)", "Tarde (13h-17h)", "Qualquer horário"];

pub const SCHEDULE_VISIT: &str = "Agendar vistoria";
pub const LOOKUP_PROTOCOL: &str = "Consultar protocolo";
pub const NEW_CERTIFICATE: &str = "Novo certificado";
pub const TALK_TO_AGENT: &str = "Falar com atendente";
pub const BACK_TO_MENU: &str = "Voltar ao menu";
pub const BACK_TO_START: &str = "Voltar ao início";

pub const MENU_OPTIONS: &[&str] = &[SCHEDULE_VISIT, LOOKUP_PROTOCOL, NEW_CERTIFICATE, TALK_TO_AGENT];
pub const AFTER_VISIT_OPTIONS: &[&str] = &[NEW_CERTIFICATE, LOOKUP_PROTOCOL, BACK_TO_START];
pub const AFTER_PROTOCOL_OPTIONS: &[&str] = &[NEW_CERTIFICATE, TALK_TO_AGENT, BACK_TO_START];

/// Reduced menus offered after an unrecognized choice
pub const MENU_FALLBACK_OPTIONS: &[&str] = &[SCHEDULE_VISIT, NEW_CERTIFICATE, BACK_TO_MENU];
pub const LATE_MENU_FALLBACK_OPTIONS: &[&str] = &[NEW_CERTIFICATE, BACK_TO_START];

pub const GREETING: &str = "Olá! Bem-vindo ao atendimento do CBMPE. 👋\n\nSou o assistente virtual e estou aqui para ajudar com a emissão de certificados.\n\nQual tipo de certificado você precisa?";
pub const ASK_NAME: &str =
    "Ótimo! Para prosseguir, preciso de algumas informações.\n\nPor favor, informe seu nome completo:";
pub const ASK_CPF: &str = "Agora, informe seu CPF:\n\n(Formato: 000.000.000-00 ou somente números)";
pub const ASK_ADDRESS: &str =
    "Qual o endereço completo do imóvel/estabelecimento?\n\n(Incluir rua, número, bairro e cidade)";
pub const ASK_BUILDING_TYPE: &str = "Qual o tipo de edificação?";
pub const ASK_VISIT_PHONE: &str = "Ótimo! Vamos agendar a vistoria.\n\nPor favor, informe seu telefone para contato:\n\n(Formato: (00) 00000-0000)";
pub const ASK_VISIT_DATE: &str = "Qual data você prefere para a vistoria?\n\n(Formato: DD/MM/AAAA)";
pub const ASK_VISIT_TIME: &str = "Qual o melhor horário?";
pub const ASK_PROTOCOL: &str =
    "Para consultar seu protocolo, por favor informe o número:\n\n(Formato: CBMPE-XXXXXXXXXX)";
pub const ASK_CONTACT_PHONE: &str = "Para solicitar contato com um atendente, primeiro preciso de seu telefone:\n\n(Formato: (00) 00000-0000)";
pub const ASK_CONTACT_REASON: &str = "Por favor, descreva brevemente o motivo do contato:";
pub const ASK_CONTACT_TIME: &str = "Qual o melhor horário para entrarmos em contato?";
pub const HOW_CAN_I_HELP: &str = "Como posso ajudar?";
pub const NOT_AVAILABLE: &str = "Esta funcionalidade estará disponível em breve. Como posso ajudar?";
pub const CHOOSE_AN_OPTION: &str = "Por favor, escolha uma das opções acima.";
pub const TYPE_AN_ANSWER: &str = "Por favor, digite sua resposta no campo abaixo.";

pub fn request_summary(session: &SessionData, protocol: &ProtocolNumber) -> String {
    format!(
        "Perfeito! Aqui está o resumo da sua solicitação:\n\n\
         📋 Certificado: {}\n\
         👤 Nome: {}\n\
         🆔 CPF: {}\n\
         📍 Endereço: {}\n\
         🏢 Tipo: {}\n\n\
         ✅ Sua solicitação foi registrada com sucesso!\n\n\
         Número do protocolo: {protocol}\n\n\
         O que deseja fazer agora?",
        session.certificate_type, session.name, session.cpf, session.address, session.building_type,
    )
}

pub fn visit_summary(
    session: &SessionData,
    original: &ProtocolNumber,
    scheduling: &ProtocolNumber,
) -> String {
    format!(
        "✅ Vistoria agendada com sucesso!\n\n\
         📋 Protocolo original: {original}\n\
         📅 Agendamento: {scheduling}\n\n\
         👤 Nome: {}\n\
         📞 Telefone: {}\n\
         📍 Endereço: {}\n\
         📆 Data: {}\n\
         🕐 Horário: {}\n\n\
         Você receberá uma confirmação por SMS em até 24h.\n\n\
         ⚠️ Importante: Tenha em mãos todos os documentos do imóvel e projetos aprovados.\n\n\
         O que deseja fazer agora?",
        session.name, session.phone, session.address, session.visit_date, session.visit_time,
    )
}

pub fn protocol_details(session: &SessionData) -> String {
    format!(
        "🔍 Detalhes do protocolo {}:\n\n\
         📋 Certificado: {}\n\
         👤 Nome: {}\n\
         🆔 CPF: {}\n\
         📍 Endereço: {}\n\
         🏢 Tipo: {}\n\
         📅 Data da vistoria: {}\n\
         🕐 Horário: {}\n\n\
         O que deseja fazer agora?",
        session.protocol_number,
        session.certificate_type,
        session.name,
        session.cpf,
        session.address,
        session.building_type,
        session.visit_date,
        session.visit_time,
    )
}

pub fn contact_confirmation(session: &SessionData, contact_time: &str) -> String {
    format!(
        "✅ Solicitação de contato registrada com sucesso!\n\n\
         👤 Nome: {}\n\
         📞 Telefone: {}\n\
         📍 Endereço: {}\n\
         📅 Data da vistoria: {}\n\
         🕐 Horário: {}\n\
         ⏰ Melhor horário para contato: {contact_time}\n\n\
         Motivo do contato: {}\n\n\
         O que deseja fazer agora?",
        session.name,
        session.phone,
        session.address,
        session.visit_date,
        session.visit_time,
        session.contact_reason,
    )
}
