use crate::byte_length::{TitleBudget, TitleLength};
use crate::category::resolver::CategoryResolution;
use crate::error::{CoreError, CoreResult, FailureKind};
use crate::keywords::model::Keyword;
use crate::pipeline::edit::{insert_keyword, KeywordInsertion};
use crate::pipeline::stage::{ItemStage, StageTransition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub product_name: String,
    pub image_url: String,
}

impl ItemInput {
    pub fn new(product_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            image_url: image_url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub original_product_name: String,
    pub image_url: String,
    pub main_keyword: String,
    pub category: CategoryResolution,
    pub generated_title: String,
    /// Merged keyword set, highest combined monthly volume first.
    pub related_keywords: Vec<Keyword>,
    pub title_keywords: Vec<Keyword>,
    pub image_features: Vec<String>,
    pub image_category: String,
    pub title_length: TitleLength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub kind: FailureKind,
    /// Stage the item was in when it failed.
    pub stage: ItemStage,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub index: usize,
    pub input: ItemInput,
    pub stage: ItemStage,
    pub history: Vec<StageTransition>,
    pub result: Option<GenerationResult>,
    pub failure: Option<ItemFailure>,
}

impl ItemReport {
    pub fn is_done(&self) -> bool {
        self.stage == ItemStage::Done
    }

    pub fn is_failed(&self) -> bool {
        self.stage == ItemStage::Failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub batch_id: String,
    pub account_id: String,
    pub budget: TitleBudget,
    pub items: Vec<ItemReport>,
}

impl BatchOutcome {
    pub fn item(&self, index: usize) -> Option<&ItemReport> {
        self.items.get(index)
    }

    pub fn done_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_done()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_failed()).count()
    }

    fn result_mut(&mut self, index: usize) -> CoreResult<&mut GenerationResult> {
        self.items
            .get_mut(index)
            .and_then(|i| i.result.as_mut())
            .ok_or_else(|| CoreError::InvalidInput(format!("item {} has no result to edit", index)))
    }

    /// Operator edit of the main keyword. Nothing else in the result changes.
    pub fn edit_main_keyword(&mut self, index: usize, main_keyword: &str) -> CoreResult<()> {
        let result = self.result_mut(index)?;
        result.main_keyword = main_keyword.to_string();
        Ok(())
    }

    /// Operator edit of the title; both byte metrics are recomputed.
    pub fn edit_title(&mut self, index: usize, title: &str) -> CoreResult<TitleLength> {
        let budget = self.budget;
        let result = self.result_mut(index)?;
        result.generated_title = title.to_string();
        result.title_length = TitleLength::measure(title, budget);
        Ok(result.title_length)
    }

    pub fn insert_into_title(
        &mut self,
        index: usize,
        char_start: usize,
        char_end: usize,
        keyword: &str,
    ) -> CoreResult<KeywordInsertion> {
        let current = self.result_mut(index)?.generated_title.clone();
        let inserted = insert_keyword(&current, char_start, char_end, keyword)?;
        self.edit_title(index, &inserted.title)?;
        Ok(inserted)
    }
}
