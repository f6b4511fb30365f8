use jess_core::{DialogError, DialogId, Message, Role};
use jess_entities::messages;
use sea_orm::Set;

pub fn message_from_model(m: messages::Model) -> Result<Message, DialogError> {
    let role = m
        .role
        .parse::<Role>()
        .map_err(|_| DialogError::Storage(format!("message {} has unknown role {}", m.id, m.role)))?;

    Ok(Message::restore(
        m.id,
        DialogId::new(m.dialog_id),
        m.created_at.and_utc(),
        role,
        m.content,
    ))
}

pub fn active_model_from_message(message: &Message) -> messages::ActiveModel {
    messages::ActiveModel {
        id: Set(message.id()),
        dialog_id: Set(message.dialog_id().as_str().to_owned()),
        role: Set(message.role().as_str().to_owned()),
        content: Set(message.content().to_owned()),
        created_at: Set(message.timestamp().naive_utc()),
    }
}
