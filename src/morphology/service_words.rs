use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// English function words: articles, prepositions, conjunctions,
    /// pronouns, particles and interjections
    pub(super) static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            // articles and determiners
            "a", "an", "the", "this", "that", "these", "those", "each", "every", "either", "neither",
            "some", "any", "no", "such",
            // prepositions
            "about", "above", "across", "after", "against", "along", "among", "around", "at",
            "before", "behind", "below", "beneath", "beside", "between", "beyond", "by", "down",
            "during", "except", "for", "from", "in", "inside", "into", "near", "of", "off", "on",
            "onto", "out", "outside", "over", "past", "per", "since", "through", "throughout",
            "till", "to", "toward", "towards", "under", "underneath", "until", "up", "upon", "via",
            "with", "within", "without",
            // conjunctions
            "and", "as", "because", "but", "if", "lest", "nor", "or", "so", "than", "though",
            "although", "unless", "whereas", "whether", "while", "yet", "once",
            // pronouns
            "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you",
            "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her",
            "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
            "themselves", "who", "whom", "whose", "which", "what", "whoever", "whatever",
            "someone", "something", "anyone", "anything", "everyone", "everything", "nobody",
            "nothing",
            // particles
            "not", "just", "only", "also", "even", "too", "very",
            // interjections
            "oh", "ah", "wow", "hey", "hi", "hello", "oops", "ouch", "alas", "hmm", "yes", "yeah",
        ];
        words.iter().copied().collect()
    };

    /// Russian function words: prepositions, conjunctions, particles,
    /// pronouns and interjections
    pub(super) static ref RUSSIAN: HashSet<&'static str> = {
        let words: &[&str] = &[
            // prepositions
            "в", "во", "на", "с", "со", "к", "ко", "по", "о", "об", "обо", "от", "ото", "до", "из",
            "изо", "у", "за", "над", "надо", "под", "подо", "перед", "передо", "при", "про",
            "для", "без", "безо", "через", "между", "сквозь", "среди", "около", "вокруг", "после",
            "кроме", "вместо", "ради",
            // conjunctions
            "и", "а", "но", "или", "либо", "да", "что", "чтобы", "если", "хотя", "как", "когда",
            "потому", "поэтому", "также", "тоже", "зато", "однако", "ни", "то", "будто", "словно",
            // particles
            "не", "бы", "ли", "же", "ведь", "вот", "вон", "даже", "лишь", "только", "уже", "ещё",
            "еще", "разве", "неужели", "пусть", "пускай", "именно",
            // pronouns
            "я", "меня", "мне", "мной", "мною", "ты", "тебя", "тебе", "тобой", "он", "его", "ему",
            "им", "нем", "нём", "она", "ее", "её", "ей", "ней", "оно", "мы", "нас", "нам", "нами",
            "вы", "вас", "вам", "вами", "они", "их", "им", "ими", "них", "себя", "себе", "собой",
            "мой", "моя", "моё", "мое", "мои", "твой", "твоя", "твои", "наш", "наша", "наши",
            "ваш", "ваша", "ваши", "свой", "своя", "свои", "этот", "эта", "это", "эти", "тот",
            "та", "те", "кто", "чей", "который", "которая", "которое", "которые", "весь", "вся",
            "всё", "все", "сам", "сама", "само", "сами",
            // interjections
            "ах", "ох", "эх", "ой", "ай", "увы", "ура", "эй", "ну",
        ];
        words.iter().copied().collect()
    };
}
