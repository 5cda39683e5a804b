use crate::generation::interface::GenerationRequest;

pub const KEYWORD_SYSTEM: &str = "당신은 상품명과 상품 이미지를 보고 소비자가 실제로 검색할 대표 키워드를 고르는 이커머스 키워드 분석가입니다.";

pub const IMAGE_SYSTEM: &str = "당신은 상품 이미지를 보고 검색 가능한 상품 특징어를 뽑는 분석가입니다.";

pub const TITLE_SYSTEM: &str = "당신은 오픈마켓(스마트스토어, 11번가, 지마켓 등)에 등록할 검색 최적화 상품명을 만드는 전문가입니다.";

pub fn keyword_prompt(product_name: &str) -> String {
    format!(
        "아래 상품명과 이미지를 보고 상품의 본질적인 카테고리를 나타내는 메인 키워드 하나만 출력하세요.\n\
         - 브랜드명, 감성 수식어(고급, 귀여운, 모던한 등)는 제외합니다.\n\
         - 상품명이 모호하면 이미지를 참고하되, 상충하면 상품명을 우선합니다.\n\
         - 띄어쓰기 없이 한 단어 또는 짧은 복합어만 출력합니다. 예: 커피머신, 무선청소기, 노트북거치대\n\n\
         상품명: \"{}\"",
        product_name
    )
}

pub fn image_prompt() -> String {
    "상품 이미지를 분석해 JSON 한 개만 출력하세요.\n\
     {\"category\": \"한 단어 카테고리\", \"features\": [\"특징어\", ...]}\n\
     features는 재질, 모양, 기능, 사용용도, 사용자, 사용장소, 대체 지칭어, 기타(계절, 크기 등) 8개 분류에서 \
     분류마다 2~3개씩 검색 가능한 구체적인 단어로 채웁니다.\n\
     색상, 검색되지 않는 형용사(예쁜, 귀여운, 부드러운 등), 오타는 쓰지 않습니다."
        .to_string()
}

pub fn title_prompt(req: &GenerationRequest) -> String {
    let join = |items: Vec<&str>| items.join(", ");
    let related = join(req.related_keywords.iter().map(|k| k.text.as_str()).collect());
    let title_keywords = join(req.title_keywords.iter().map(|k| k.text.as_str()).collect());
    let features = join(req.image_features.iter().map(String::as_str).collect());
    let category = req.category.path.join(" > ");
    let budget = req.constraints.budget;

    format!(
        "상품 정보\n\
         - 원본 상품명: {name}\n\
         - 카테고리: {category}\n\
         - 메인 키워드: {main}\n\
         - 이미지 특징어: {features}\n\
         - 연관 키워드(월간 검색량 높은 순): {related}\n\
         - 실제 판매 상품명에서 자주 쓰인 키워드: {title_keywords}\n\n\
         규칙\n\
         1. 상품명 맨 앞에 핵심 메인 키워드, 바로 뒤에 메인 키워드를 둡니다. 둘 다 연관 키워드에 있는 표기를 그대로 씁니다.\n\
         2. 메인 키워드는 가능하면 '실제 판매 상품명에서 자주 쓰인 키워드' 중에서 고릅니다.\n\
         3. 이미지 특징어는 상품과 직접 관련 있을 때만, 최대 {max_features}개까지 씁니다.\n\
         4. 검색되지 않는 꾸밈 형용사, 같은 단어 3회 이상 반복을 피합니다.\n\
         5. 전체 길이는 UTF-8 기준 {min}~{max} byte입니다.\n\n\
         상품명 한 줄만 출력하세요.",
        name = req.seed_product_name,
        category = category,
        main = req.main_keyword,
        features = features,
        related = related,
        title_keywords = title_keywords,
        max_features = req.constraints.max_image_features,
        min = budget.min_bytes,
        max = budget.max_bytes,
    )
}
