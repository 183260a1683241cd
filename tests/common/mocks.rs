use async_trait::async_trait;
use imagegen_rust::{
    Error, Result,
    prediction::{
        ApiReply, CreatePredictionRequest, Prediction, PredictionOutput, PredictionService,
        PredictionStatus,
    },
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One canned reply from the prediction service.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(ApiReply<Prediction>),
    Error(String),
}

impl Scripted {
    pub fn status(status: PredictionStatus) -> Self {
        Self::Reply(ApiReply::Accepted(Prediction {
            id: Some("p1".to_string()),
            status,
            output: None,
            error: None,
        }))
    }

    pub fn succeeded(output: PredictionOutput) -> Self {
        Self::Reply(ApiReply::Accepted(Prediction {
            id: Some("p1".to_string()),
            status: PredictionStatus::Succeeded,
            output: Some(output),
            error: None,
        }))
    }

    pub fn rejected(status: u16) -> Self {
        Self::Reply(ApiReply::Rejected { status })
    }

    fn to_result(&self) -> Result<ApiReply<Prediction>> {
        match self {
            Self::Reply(reply) => Ok(reply.clone()),
            Self::Error(message) => Err(Error::upstream(message.clone())),
        }
    }
}

/// Prediction service that replays a script and records what it was asked.
#[derive(Debug)]
pub struct ScriptedPredictionService {
    create: Scripted,
    polls: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    pub create_calls: Mutex<Vec<(String, CreatePredictionRequest)>>,
    pub poll_calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedPredictionService {
    pub fn new(create: Scripted) -> Self {
        Self {
            create,
            polls: Mutex::new(VecDeque::new()),
            fallback: Scripted::status(PredictionStatus::Processing),
            create_calls: Mutex::new(Vec::new()),
            poll_calls: Mutex::new(Vec::new()),
        }
    }

    /// A service whose create call hands back prediction `p1`.
    pub fn started() -> Self {
        Self::new(Scripted::Reply(ApiReply::Accepted(Prediction {
            id: Some("p1".to_string()),
            status: PredictionStatus::Starting,
            output: None,
            error: None,
        })))
    }

    pub fn then_poll(self, reply: Scripted) -> Self {
        self.polls.lock().unwrap().push_back(reply);
        self
    }

    /// Reply used once the scripted polls are used up.
    pub fn otherwise(mut self, reply: Scripted) -> Self {
        self.fallback = reply;
        self
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.lock().unwrap().len()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionService for ScriptedPredictionService {
    async fn create_prediction(
        &self,
        api_key: &str,
        request: &CreatePredictionRequest,
    ) -> Result<ApiReply<Prediction>> {
        self.create_calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        self.create.to_result()
    }

    async fn get_prediction(&self, api_key: &str, id: &str) -> Result<ApiReply<Prediction>> {
        self.poll_calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), id.to_string()));

        let next = self.polls.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone()).to_result()
    }
}
